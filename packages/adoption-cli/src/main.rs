use std::sync::Arc;

use adoption_api::{Pet, SignInRequest};
use adoption_store::selectors::{self, PetFilter};
use adoption_store::{catalog, AuthError, EffectOutcome, EffectRunner, Store, StoreConfig};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STAFF_ROLE: &str = "staff";

#[derive(Parser)]
#[command(name = "adopt", about = "Pet adoption client", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and persist the session
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the persisted session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Browse the pet catalog
    Pets {
        /// Matches pet or owner name
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long, default_value_t = 10)]
        page_size: usize,
    },
    /// List pets awaiting staff verification
    VerifyQueue,
    /// Approve or reject a pet listing
    Verify {
        pet_id: i64,
        #[arg(long, conflicts_with = "reject", required_unless_present = "reject")]
        approve: bool,
        #[arg(long)]
        reject: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,adoption_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = StoreConfig::from_env().context("Failed to load configuration")?;
    debug!(
        api_base_url = %config.api_base_url,
        token_path = %config.token_path.display(),
        "Loaded configuration"
    );
    let credentials = config.credential_store();
    let store = Arc::new(Store::restore(&credentials, Utc::now()).await);
    let client = config.api_client()?;
    let runner = Arc::new(EffectRunner::new(store, Arc::new(client), credentials));

    match cli.command {
        Command::Login { email, password } => login(&runner, email, password).await,
        Command::Logout => {
            runner.logout().await;
            println!("{}", "Signed out".bright_blue());
            Ok(())
        }
        Command::Whoami => whoami(&runner).await,
        Command::Pets {
            search,
            category,
            gender,
            status,
            page,
            page_size,
        } => {
            let filter = PetFilter {
                search,
                category,
                gender,
                adoption_status: status,
            };
            list_pets(&runner, &filter, page, page_size).await
        }
        Command::VerifyQueue => verify_queue(&runner).await,
        Command::Verify {
            pet_id, approve, ..
        } => verify(&runner, pet_id, approve).await,
    }
}

async fn login(runner: &EffectRunner, email: Option<String>, password: Option<String>) -> Result<()> {
    let theme = ColorfulTheme::default();
    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&theme).with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()?,
    };

    match runner.sign_in(SignInRequest { email, password }).await {
        Ok(()) => {
            let name = runner.store().select(|s| {
                selectors::user_info(s)
                    .and_then(|u| u.display_name().or(u.email()).map(str::to_string))
            });
            println!(
                "{} {}",
                "Signed in as".bright_green(),
                name.unwrap_or_else(|| "unknown user".into()).bold()
            );
            Ok(())
        }
        Err(AuthError::Rejected { message, .. }) => bail!("Sign-in rejected: {message}"),
        Err(e) => Err(e).context("Sign-in failed"),
    }
}

async fn whoami(runner: &EffectRunner) -> Result<()> {
    runner.bootstrap(Utc::now()).await;

    let state = runner.store().state();
    let Some(user) = selectors::user_info(&state) else {
        println!("{}", "Not signed in".yellow());
        return Ok(());
    };

    println!(
        "{} {}",
        "User:".bold(),
        user.display_name().unwrap_or("(no name)")
    );
    if let Some(id) = user.user_id() {
        println!("{} {}", "Id:".bold(), id);
    }
    if let Some(email) = user.email() {
        println!("{} {}", "Email:".bold(), email);
    }
    let roles = user.roles();
    if !roles.is_empty() {
        println!("{} {}", "Roles:".bold(), roles.join(", "));
    }
    Ok(())
}

async fn load_pets(runner: &EffectRunner) -> Result<()> {
    match runner.get_all_pets().await {
        EffectOutcome::Failed(reason) => bail!("Failed to load pets: {reason}"),
        _ => Ok(()),
    }
}

async fn list_pets(
    runner: &EffectRunner,
    filter: &PetFilter,
    page: usize,
    page_size: usize,
) -> Result<()> {
    load_pets(runner).await?;

    let state = runner.store().state();
    let matching: Vec<Pet> = selectors::filter_pets(&state, filter)
        .into_iter()
        .cloned()
        .collect();
    let page = selectors::paginate(&matching, page, page_size);

    if page.items.is_empty() {
        println!("{}", "No pets match".yellow());
        return Ok(());
    }

    for pet in &page.items {
        print_pet(pet);
    }
    println!(
        "{}",
        format!(
            "Page {}/{} ({} pets)",
            page.page, page.total_pages, page.total_items
        )
        .dimmed()
    );
    Ok(())
}

fn require_staff(runner: &EffectRunner) -> Result<()> {
    if !runner
        .store()
        .select(|s| selectors::can_access(s, &[STAFF_ROLE]))
    {
        bail!("Staff access required; run `adopt login` with a staff account");
    }
    Ok(())
}

async fn verify_queue(runner: &EffectRunner) -> Result<()> {
    runner.bootstrap(Utc::now()).await;
    require_staff(runner)?;
    load_pets(runner).await?;
    runner.get_pets_needing_verification();

    let queue = runner
        .store()
        .select(|s| selectors::pets_needing_verification(s).to_vec());
    if queue.is_empty() {
        println!("{}", "Nothing awaiting verification".bright_green());
        return Ok(());
    }

    for pet in &queue {
        print_pet(pet);
    }
    Ok(())
}

async fn verify(runner: &EffectRunner, pet_id: i64, approve: bool) -> Result<()> {
    runner.bootstrap(Utc::now()).await;
    require_staff(runner)?;
    load_pets(runner).await?;
    runner.get_pets_needing_verification();

    match runner.verify_pet(pet_id, approve).await {
        EffectOutcome::Failed(reason) => bail!("Verification failed: {reason}"),
        outcome => {
            debug!(pet_id, ?outcome, "Verification finished");
            let verdict = if approve {
                "approved".bright_green()
            } else {
                "rejected".bright_red()
            };
            println!("Pet {} {}", pet_id, verdict);
            Ok(())
        }
    }
}

fn print_pet(pet: &Pet) {
    let status = match catalog::effective_status(pet) {
        adoption_api::VerificationStatus::Verified => "verified".green(),
        adoption_api::VerificationStatus::Rejected => "rejected".red(),
        _ => "pending".yellow(),
    };

    println!(
        "{:>5}  {:<20} {:<10} {:<8} {}",
        pet.pet_id,
        pet.pet_name.bold(),
        pet.category_name.as_deref().unwrap_or("-"),
        pet.gender.as_deref().unwrap_or("-"),
        status
    );
}
