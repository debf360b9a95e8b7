use clap::{Parser, Subcommand};
use homefix_app::{config::AppConfig, context::AppContext};

mod addresses;
mod bookings;
mod cart;
mod catalog;
mod checkout;
mod profile;
mod table;

#[derive(Debug, Parser)]
#[command(name = "homefix", about = "Homefix CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse services
    Catalog(catalog::CatalogCommand),

    /// Manage the cart
    Cart(cart::CartCommand),

    /// Manage saved addresses
    Addresses(addresses::AddressesCommand),

    /// Price and place an order for the cart
    Checkout(checkout::CheckoutCommand),

    /// Review and update bookings
    Bookings(bookings::BookingsCommand),

    /// Show or change the signed-in profile
    Profile(profile::ProfileCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let ctx = AppContext::from_config(&self.config)
            .map_err(|error| format!("failed to start: {error}"))?;

        match self.command {
            Commands::Catalog(command) => catalog::run(&ctx, command).await,
            Commands::Cart(command) => cart::run(&ctx, command).await,
            Commands::Addresses(command) => addresses::run(&ctx, command).await,
            Commands::Checkout(command) => checkout::run(&ctx, command).await,
            Commands::Bookings(command) => bookings::run(&ctx, command).await,
            Commands::Profile(command) => profile::run(&ctx, command).await,
        }
    }
}
