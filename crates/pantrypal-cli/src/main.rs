use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pantrypal_api::{AuthRequest, PantryClient, ProfileUpdate};
use pantrypal_core::adapters::HttpSyncAdapter;
use pantrypal_core::{
    build_alerts, Category, Config, ExpiryDate, ItemStore, ListFilter, PantryItem, Session, Unit,
};

#[derive(Parser)]
#[command(name = "pantrypal")]
#[command(version, about = "Pantry tracker with expiry alerts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Email used as the account identifier
        email: String,
        password: String,
    },
    /// Create an account
    Signup {
        name: String,
        email: String,
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// List pantry items
    List {
        /// Substring to match against item names (case-insensitive)
        #[arg(long)]
        search: Option<String>,
        /// Restrict to one category
        #[arg(long)]
        category: Option<Category>,
    },
    /// Add an item; expiry defaults to server-side prediction
    Add {
        name: String,
        #[arg(long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(long, default_value = "pieces")]
        unit: Unit,
        #[arg(long, default_value = "general")]
        category: Category,
        /// Expiry date (YYYY-MM-DD) or "auto"
        #[arg(long, default_value = "auto")]
        expiry: ExpiryDate,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Edit an existing item (unspecified fields keep their value)
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        unit: Option<Unit>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        expiry: Option<ExpiryDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an item
    Remove { id: String },
    /// Show the expiry alert list, most urgent first
    Alerts,
    /// Recipe suggestions based on the current pantry
    Recipes,
    /// Show the profile; pass --name/--password to change it
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        password: Option<String>,
        /// Delete the account and clear the session
        #[arg(long)]
        delete: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pantrypal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let client = Arc::new(PantryClient::with_retry_config(
        config.api.base_url.clone(),
        config.retry.to_retry_config(),
    ));

    match cli.command {
        Commands::Login { email, password } => {
            check_email(&email)?;
            client
                .login(&AuthRequest {
                    user_name: String::new(),
                    user_id: email.clone(),
                    password,
                })
                .await
                .context("login failed")?;
            Session::new(email).save()?;
            println!("Logged in.");
        }
        Commands::Signup {
            name,
            email,
            password,
        } => {
            check_email(&email)?;
            check_password(&password)?;
            client
                .signup(&AuthRequest {
                    user_name: name,
                    user_id: email,
                    password,
                })
                .await
                .context("signup failed")?;
            println!("Account created. Run `pantrypal login` to start a session.");
        }
        Commands::Logout => {
            Session::clear()?;
            println!("Logged out.");
        }
        Commands::List { search, category } => {
            let store = open_store(&client).await?;
            let filter = ListFilter {
                name_contains: search,
                category,
            };
            let items = store.list(Some(&filter)).await;
            if items.is_empty() {
                println!("No items found.");
            }
            for item in items {
                print_item(&item);
            }
        }
        Commands::Add {
            name,
            quantity,
            unit,
            category,
            expiry,
            notes,
        } => {
            let store = open_store(&client).await?;
            let mut item = PantryItem::new(name, quantity, unit, category, today());
            item.expiry_date = expiry;
            item.notes = notes;
            let added = store.add(item).await?;
            println!("Added {} (id {}), expires {}", added.name, added.id, added.expiry_date);
        }
        Commands::Update {
            id,
            name,
            quantity,
            unit,
            category,
            expiry,
            notes,
        } => {
            let store = open_store(&client).await?;
            let current = store
                .list(None)
                .await
                .into_iter()
                .find(|i| i.id == id)
                .with_context(|| format!("no item with id {}", id))?;

            let mut item = current;
            if let Some(name) = name {
                item.name = name;
            }
            if let Some(quantity) = quantity {
                item.quantity = quantity;
            }
            if let Some(unit) = unit {
                item.unit = unit;
            }
            if let Some(category) = category {
                item.category = category;
            }
            if let Some(expiry) = expiry {
                item.expiry_date = expiry;
            }
            if let Some(notes) = notes {
                item.notes = Some(notes);
            }

            store.update(item).await?;
            println!("Updated {}.", id);
        }
        Commands::Remove { id } => {
            let store = open_store(&client).await?;
            let removed = store.remove(&id).await?;
            println!("Removed {}.", removed.name);
        }
        Commands::Alerts => {
            let store = open_store(&client).await?;
            let items = store.list(None).await;
            let alerts = build_alerts(&items, Utc::now());
            if alerts.is_empty() {
                println!("All clear - nothing is approaching expiration.");
            }
            for alert in alerts {
                let when = if alert.days_until_expiry <= 0 {
                    "expired".to_string()
                } else {
                    format!("expires in {} day(s)", alert.days_until_expiry)
                };
                println!(
                    "[{}] {} - {}",
                    alert.severity, alert.item.name, when
                );
            }
        }
        Commands::Recipes => {
            let session = require_session()?;
            let recipes = client.get_recipes(session.owner_id()).await?;
            if recipes.is_empty() {
                println!("No suggestions yet - add more items to your pantry.");
            }
            for recipe in recipes {
                println!("{} ({} steps)", recipe.title, recipe.steps.len());
                for (i, step) in recipe.steps.iter().enumerate() {
                    println!("  {}. {}", i + 1, step);
                }
            }
        }
        Commands::Profile {
            name,
            password,
            delete,
        } => {
            let session = require_session()?;
            if delete {
                client.delete_profile(session.owner_id()).await?;
                Session::clear()?;
                println!("Account deleted.");
                return Ok(());
            }
            if name.is_some() || password.is_some() {
                if let Some(password) = &password {
                    check_password(password)?;
                }
                client
                    .update_profile(session.owner_id(), &ProfileUpdate { name, password })
                    .await?;
                println!("Profile updated.");
            } else {
                let display_name = client.get_name(session.owner_id()).await?;
                println!("{} <{}>", display_name, session.owner_id());
            }
        }
    }

    Ok(())
}

fn require_session() -> anyhow::Result<Session> {
    Session::load()?.context("not logged in - run `pantrypal login` first")
}

/// Build the store for the logged-in user and pull the current item set.
async fn open_store(client: &Arc<PantryClient>) -> anyhow::Result<ItemStore> {
    let session = require_session()?;
    tracing::debug!("refreshing pantry for {}", session.owner_id());
    let adapter = Arc::new(HttpSyncAdapter::new(Arc::clone(client)));
    let store = ItemStore::new(session, adapter.clone()).with_predictor(adapter);
    store.refresh().await?;
    Ok(store)
}

fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}

fn print_item(item: &PantryItem) {
    println!(
        "{}  {}: {} {} [{}]  added {}  expires {}{}",
        item.id,
        item.name,
        item.quantity,
        item.unit,
        item.category,
        item.added_date,
        item.expiry_date,
        item.notes
            .as_deref()
            .map(|n| format!("  \"{}\"", n))
            .unwrap_or_default()
    );
}

/// Same password rules the signup form enforces: at least 8 characters with
/// an uppercase letter, a lowercase letter, a digit, and one of !@#$%^&*.
/// Same email shape the signup form accepts: local part, one `@`, a dotted
/// domain whose last label is at least two letters. Catches typos before a
/// round trip to the server; the server stays the authority.
fn check_email(email: &str) -> anyhow::Result<()> {
    let Some((local, domain)) = email.split_once('@') else {
        bail!("email must contain an @");
    };
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let tld_ok = domain
        .rsplit_once('.')
        .map(|(_, tld)| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
        .unwrap_or(false);
    let domain_ok = domain.chars().all(|c| c.is_ascii_alphanumeric() || ".-".contains(c));
    if !(local_ok && domain_ok && tld_ok) {
        bail!("not a valid email address: {}", email);
    }
    Ok(())
}

/// Same password rules the signup form enforces: at least 8 characters with
/// an uppercase letter, a lowercase letter, a digit, and one of !@#$%^&*.
fn check_password(password: &str) -> anyhow::Result<()> {
    if password.len() < 8 {
        bail!("password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        bail!("password must contain an uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        bail!("password must contain a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        bail!("password must contain a digit");
    }
    if !password.chars().any(|c| "!@#$%^&*".contains(c)) {
        bail!("password must contain a special character (!@#$%^&*)");
    }
    Ok(())
}
