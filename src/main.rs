use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;
use cli_style::{
    get_styles, print_empty_list, print_error, print_info, print_key_value, print_list_item,
    print_section_footer, print_section_header, print_success, print_warning, TableBuilder,
};

use showroom_console::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_API_URL, DEFAULT_IMAGE, DEFAULT_REQUEST_TIMEOUT_SEC,
    DEFAULT_STORAGE_PATH,
};
use showroom_console::images::ImageAssociationStore;
use showroom_console::inventory::{
    InventoryClient, InventoryItem, InventoryItemId, ListedItem, NewInventoryItem,
};
use showroom_console::local_storage::{LocalStorage, Saved, SqliteLocalStorage};
use showroom_console::routes::{nav_entries, navigate, Navigation, Route};
use showroom_console::user::{Action, Authenticator, RestAuthenticator, SessionState};
use showroom_console::{Showroom, ShowroomError};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Base URL of the dealership REST API.
    #[clap(long, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Path to the SQLite file holding the session and image associations.
    #[clap(long, default_value = DEFAULT_STORAGE_PATH)]
    pub storage_path: PathBuf,

    /// Image shown for cars without images of their own.
    #[clap(long, default_value = DEFAULT_IMAGE)]
    pub default_image: String,

    /// Timeout in seconds for backend requests.
    #[clap(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SEC)]
    pub request_timeout_sec: u64,

    /// Optional TOML config file, its values override the flags above.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[derive(Parser)]
#[command(styles=get_styles(), name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Logs in with the given credentials.
    Login { username: String, password: String },

    /// Forgets the current session.
    Logout,

    /// Shows the current user and role.
    Whoami,

    /// Opens a page, as a browser would, honoring the route guard.
    Open { path: String },

    /// Lists the navigation entries available to the current user.
    Nav,

    /// Tells whether the current user may perform an action, e.g. `can add_car`.
    Can { action: String },

    /// Lists the inventory with the images of each car.
    Cars,

    /// Shows totals over the whole inventory.
    Stats,

    /// Shows the average price of the inventory.
    AveragePrice,

    /// Lists the most expensive cars.
    Expensive,

    /// Lists the cars running out of stock.
    LowStock,

    /// Adds a car to the inventory.
    AddCar {
        brand: String,
        model: String,
        year: i32,
        price: String,
        stock: u32,
        /// Image of the car, repeat for more. The first one is the primary image.
        #[clap(long = "image")]
        images: Vec<String>,
    },

    /// Replaces a car. Images are left as they are unless `--image` is given.
    EditCar {
        id: u64,
        brand: String,
        model: String,
        year: i32,
        price: String,
        stock: u32,
        #[clap(long = "image")]
        images: Vec<String>,
    },

    /// Removes a car from the inventory, together with its images.
    DeleteCar { id: u64 },

    /// Shows the images of a car.
    Images { id: u64 },

    /// Replaces the images of a car.
    SetImages {
        id: u64,
        #[clap(required = true)]
        images: Vec<String>,
    },

    /// Removes the images of a car, it falls back to the default image.
    ClearImages { id: u64 },

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

impl From<ShowroomError> for CommandExecutionResult {
    fn from(err: ShowroomError) -> Self {
        match err {
            ShowroomError::NotLoggedIn | ShowroomError::Forbidden { .. } => {
                print_warning(&err.to_string());
                CommandExecutionResult::Ok
            }
            err => CommandExecutionResult::Error(err.to_string()),
        }
    }
}

/// Warns when the change only lives in memory.
fn warn_if_unsaved<T>(saved: &Saved<T>) {
    if let Some(err) = saved.warning() {
        print_warning(&format!("Not saved locally, it will be lost on restart: {}", err));
    }
}

fn print_cars(title: &str, cars: &[ListedItem], empty: &str) {
    print_section_header(title);
    if cars.is_empty() {
        print_empty_list(empty);
    } else {
        let mut table =
            TableBuilder::new(&["Id", "Brand", "Model", "Year", "Price", "Stock", "Image"]);
        for car in cars {
            table.add_row(vec![
                car.item.id.to_string(),
                car.item.brand.clone(),
                car.item.model.clone(),
                car.item.year.to_string(),
                car.item.price.clone(),
                car.item.stock.to_string(),
                car.primary_image().to_string(),
            ]);
        }
        table.print();
    }
    print_section_footer();
}

fn print_low_stock(cars: &[InventoryItem]) {
    print_section_header("Low Stock");
    if cars.is_empty() {
        print_empty_list("Every car is well stocked");
    } else {
        let mut table = TableBuilder::new(&["Id", "Brand", "Model", "Year", "Price", "Stock"]);
        for car in cars {
            table.add_row(vec![
                car.id.to_string(),
                car.brand.clone(),
                car.model.clone(),
                car.year.to_string(),
                car.price.clone(),
                car.stock.to_string(),
            ]);
        }
        table.print();
    }
    print_section_footer();
}

fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| "n/a".to_string(), |price| format!("{:.2}", price))
}

/// Shows what a page displays. Pages without inventory content print nothing.
async fn show_page(route: Route, showroom: &Showroom) -> CommandExecutionResult {
    match route {
        Route::Home => match showroom.list_cars().await {
            Ok(cars) => print_cars("Inventory", &cars, "No cars in stock"),
            Err(err) => return err.into(),
        },
        Route::Statistics => match showroom.statistics().await {
            Ok(stats) => {
                print_section_header("Statistics");
                print_key_value("Total cars", &stats.total_cars.to_string());
                print_key_value("Average price", &format_price(stats.average_price));
                print_key_value(
                    "Total stock",
                    &stats.total_stock.unwrap_or_default().to_string(),
                );
                print_key_value("Unique models", &stats.unique_models.to_string());
                print_section_footer();
            }
            Err(err) => return err.into(),
        },
        Route::PriceAggregate => match showroom.average_price().await {
            Ok(Some(price)) => print_key_value("Average price", &format_price(Some(price))),
            Ok(None) => print_empty_list("No cars available"),
            Err(err) => return err.into(),
        },
        Route::PremiumListing => match showroom.premium_listing().await {
            Ok(cars) => print_cars(
                "Expensive Cars",
                &cars,
                "No premium vehicles currently available",
            ),
            Err(err) => return err.into(),
        },
        Route::LowStock => match showroom.low_stock().await {
            Ok(cars) => print_low_stock(&cars),
            Err(err) => return err.into(),
        },
        Route::Login | Route::Register | Route::Sales | Route::Customers => {}
    }
    CommandExecutionResult::Ok
}

async fn execute_command(line: &str, showroom: &mut Showroom) -> CommandExecutionResult {
    if line.trim().is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = match InnerCli::try_parse_from(
        std::iter::once(" ").chain(args.iter().map(String::as_str)),
    ) {
        Ok(cli) => cli,
        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
            return CommandExecutionResult::Ok;
        }
    };

    match cli.command {
        InnerCommand::Login { username, password } => {
            match showroom.session().login(&username, &password).await {
                Ok(saved) => {
                    print_success(&format!(
                        "Logged in as {} ({})",
                        saved.value.username, saved.value.role
                    ));
                    warn_if_unsaved(&saved);
                }
                Err(err) => return CommandExecutionResult::Error(err.to_string()),
            }
        }
        InnerCommand::Logout => {
            showroom.session().logout();
            print_success("Logged out");
        }
        InnerCommand::Whoami => match showroom.session().current() {
            Some(session) => {
                print_key_value("User", &session.username);
                print_key_value("Role", session.role.as_str());
            }
            None => print_info("Not logged in"),
        },
        InnerCommand::Open { path } => {
            let session = showroom.session().current();
            match navigate(session.as_ref(), &path) {
                Navigation::Render(route) => {
                    print_success(&format!("{} ({})", route.title(), route.path()));
                    return show_page(route, showroom).await;
                }
                Navigation::Redirect(route) => print_warning(&format!(
                    "Redirected to {} ({})",
                    route.title(),
                    route.path()
                )),
                Navigation::NotFound => {
                    return CommandExecutionResult::Error(format!("No page at {}", path))
                }
            }
        }
        InnerCommand::Nav => {
            let session = showroom.session().current();
            let entries = nav_entries(session.as_ref());
            if entries.is_empty() {
                print_empty_list("Log in to see the navigation bar");
            }
            for route in entries {
                print_list_item(&format!("{}  {}", route.title(), route.path()), 1);
            }
        }
        InnerCommand::Can { action } => {
            let Some(action) = Action::from_str(&action) else {
                let known: Vec<&str> = Action::ALL.iter().map(|a| a.as_str()).collect();
                return CommandExecutionResult::Error(format!(
                    "Unknown action '{}'. Known actions: {}",
                    action,
                    known.join(", ")
                ));
            };
            let allowed = showroom
                .session()
                .current()
                .is_some_and(|session| session.is_allowed(action));
            if allowed {
                print_success(&format!("Allowed to {}", action));
            } else {
                print_warning(&format!("Not allowed to {}", action));
            }
        }
        InnerCommand::Cars => return show_page(Route::Home, showroom).await,
        InnerCommand::Stats => return show_page(Route::Statistics, showroom).await,
        InnerCommand::AveragePrice => return show_page(Route::PriceAggregate, showroom).await,
        InnerCommand::Expensive => return show_page(Route::PremiumListing, showroom).await,
        InnerCommand::LowStock => return show_page(Route::LowStock, showroom).await,
        InnerCommand::AddCar {
            brand,
            model,
            year,
            price,
            stock,
            images,
        } => {
            let item = NewInventoryItem {
                brand,
                model,
                year,
                price,
                stock,
            };
            match showroom.add_car(&item, images).await {
                Ok(saved) => {
                    print_success(&format!("Added car {}", saved.value.id));
                    warn_if_unsaved(&saved);
                }
                Err(err) => return err.into(),
            }
        }
        InnerCommand::EditCar {
            id,
            brand,
            model,
            year,
            price,
            stock,
            images,
        } => {
            let item = NewInventoryItem {
                brand,
                model,
                year,
                price,
                stock,
            };
            let images = if images.is_empty() { None } else { Some(images) };
            match showroom.edit_car(InventoryItemId(id), &item, images).await {
                Ok(saved) => {
                    print_success(&format!("Updated car {}", saved.value.id));
                    warn_if_unsaved(&saved);
                }
                Err(err) => return err.into(),
            }
        }
        InnerCommand::DeleteCar { id } => match showroom.delete_car(InventoryItemId(id)).await {
            Ok(saved) => {
                print_success(&format!("Deleted car {}", id));
                warn_if_unsaved(&saved);
            }
            Err(err) => return err.into(),
        },
        InnerCommand::Images { id } => match showroom.item_images(InventoryItemId(id)) {
            Ok(images) => {
                for image in images {
                    print_list_item(&image, 1);
                }
            }
            Err(err) => return err.into(),
        },
        InnerCommand::SetImages { id, images } => {
            match showroom.set_item_images(InventoryItemId(id), images) {
                Ok(saved) => {
                    print_success(&format!(
                        "Car {} now has {} image(s)",
                        id,
                        saved.value.len()
                    ));
                    warn_if_unsaved(&saved);
                }
                Err(err) => return err.into(),
            }
        }
        InnerCommand::ClearImages { id } => {
            match showroom.clear_item_images(InventoryItemId(id)) {
                Ok(saved) => {
                    print_success(&format!("Car {} shows the default image", id));
                    warn_if_unsaved(&saved);
                }
                Err(err) => return err.into(),
            }
        }
        InnerCommand::Exit => return CommandExecutionResult::Exit,
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct ConsoleHelper {
    commands_names: Vec<String>,
}

impl ConsoleHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        ConsoleHelper { commands_names }
    }
}

impl Completer for ConsoleHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for ConsoleHelper {}
impl Validator for ConsoleHelper {}
impl Helper for ConsoleHelper {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install logging")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        api_url: cli_args.api_url,
        storage_path: cli_args.storage_path,
        default_image: cli_args.default_image,
        request_timeout_sec: cli_args.request_timeout_sec,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening local storage at {:?}...", config.storage_path);
    let storage: Arc<dyn LocalStorage> = Arc::new(SqliteLocalStorage::new(&config.storage_path)?);

    // images must be loaded before the first inventory listing
    let images = ImageAssociationStore::load(storage.clone(), config.default_image.clone());

    let authenticator: Arc<dyn Authenticator> = Arc::new(RestAuthenticator::new(
        &config.api_url,
        config.request_timeout_sec,
    )?);
    let session = SessionState::new(storage, authenticator);
    let restored = session.rehydrate();

    let inventory = InventoryClient::new(&config.api_url, config.request_timeout_sec)?;
    let mut showroom = Showroom::new(session, images, inventory);

    cli_style::print_welcome(&config.api_url, &config.storage_path.display().to_string());
    if let Some(restored) = restored {
        print_info(&format!(
            "Welcome back {} ({})",
            restored.username, restored.role
        ));
    }

    let rl_config = Config::builder()
        .completion_type(CompletionType::List)
        .build();
    let mut rl = Editor::<ConsoleHelper, FileHistory>::with_config(rl_config)?;
    rl.set_helper(Some(ConsoleHelper::new()));

    loop {
        let username = showroom.session().current().map(|s| s.username);
        let readline = rl.readline(&cli_style::get_prompt(username.as_deref()));
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(&line, &mut showroom).await {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => print_error(&err),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                print_error(&format!("{:?}", e));
                break;
            }
        }
    }
    cli_style::print_goodbye();
    Ok(())
}
