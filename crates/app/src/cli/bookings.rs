use clap::{Args, Subcommand};
use homefix::{
    bookings::{Booking, BookingId},
    catalog::ProviderId,
    pricing::rupees,
};
use homefix_app::context::AppContext;

use super::table;

#[derive(Debug, Args)]
pub(crate) struct BookingsCommand {
    #[command(subcommand)]
    command: BookingsSubcommand,
}

#[derive(Debug, Subcommand)]
enum BookingsSubcommand {
    /// List bookings of the signed-in user, or of a provider
    List {
        /// Show bookings assigned to this provider instead
        #[arg(long)]
        provider: Option<String>,
    },

    /// Cancel a pending or confirmed booking
    Cancel { id: String },

    /// Confirm a pending booking
    Confirm { id: String },

    /// Mark a confirmed booking as completed
    Complete { id: String },

    /// Show a provider's earnings from completed bookings
    Earnings { provider: String },

    /// Merge bookings from the backend into this device
    Sync,

    /// Forget every booking on this device
    Clear,
}

pub(crate) async fn run(ctx: &AppContext, command: BookingsCommand) -> Result<(), String> {
    match command.command {
        BookingsSubcommand::List { provider } => {
            let bookings = match provider {
                Some(provider) => ctx.bookings.by_provider(&ProviderId::new(provider)),
                None => match ctx.gateway.session() {
                    Some(session) => ctx.bookings.by_user(&session.user_id),
                    None => match ctx.profiles.cached() {
                        Some(profile) => ctx.bookings.by_user(&profile.id),
                        None => ctx.bookings.bookings(),
                    },
                },
            };

            if bookings.is_empty() {
                println!("no bookings");
            } else {
                println!("{}", bookings_table(&bookings));
            }
        }
        BookingsSubcommand::Cancel { id } => {
            let booking = ctx
                .bookings
                .cancel(&BookingId::new(id))
                .map_err(|error| error.to_string())?;
            println!("{} is {}", booking.id, booking.status);
        }
        BookingsSubcommand::Confirm { id } => {
            let booking = ctx
                .bookings
                .confirm(&BookingId::new(id))
                .map_err(|error| error.to_string())?;
            println!("{} is {}", booking.id, booking.status);
        }
        BookingsSubcommand::Complete { id } => {
            let booking = ctx
                .bookings
                .complete(&BookingId::new(id))
                .map_err(|error| error.to_string())?;
            println!("{} is {}", booking.id, booking.status);
        }
        BookingsSubcommand::Earnings { provider } => {
            let earned = ctx.bookings.provider_earnings(&ProviderId::new(provider));
            println!("{}", rupees(earned));
        }
        BookingsSubcommand::Sync => {
            let merged = ctx
                .bookings
                .sync_from_remote(ctx.gateway.as_ref())
                .await
                .map_err(|error| format!("failed to sync bookings: {error}"))?;
            println!("merged {merged} bookings");
        }
        BookingsSubcommand::Clear => {
            ctx.bookings.clear();
            println!("bookings cleared");
        }
    }

    Ok(())
}

fn bookings_table(bookings: &[Booking]) -> String {
    table::render(
        ["Id", "Service", "Date", "Time", "Status", "Price", "Tip"],
        bookings.iter().map(|booking| {
            [
                booking.id.to_string(),
                booking
                    .service_name
                    .clone()
                    .unwrap_or_else(|| booking.service_id.to_string()),
                booking.date.to_string(),
                booking.time.clone(),
                booking.status.to_string(),
                rupees(booking.price).to_string(),
                booking
                    .tip_amount
                    .map(|tip| rupees(tip).to_string())
                    .unwrap_or_default(),
            ]
        }),
        5..7,
    )
}
