use clap::{Args, Subcommand};
use homefix::{
    addresses::AddressId,
    pricing::{PriceBreakdown, rupees},
    schedule::{TIME_SLOTS, available_dates},
};
use homefix_app::{
    context::AppContext,
    domain::checkout::{
        CheckoutError,
        models::{BookingOutcome, CheckoutRequest},
    },
};
use jiff::{Zoned, civil::Date};

use super::{addresses, table};

#[derive(Debug, Args)]
pub(crate) struct CheckoutCommand {
    #[command(subcommand)]
    command: CheckoutSubcommand,
}

#[derive(Debug, Subcommand)]
enum CheckoutSubcommand {
    /// List bookable dates and time slots
    Slots,

    /// Price the cart
    Quote {
        /// Tip in rupees
        #[arg(long, default_value_t = 0)]
        tip: u64,
    },

    /// Book everything in the cart
    Place(PlaceArgs),
}

#[derive(Debug, Args)]
struct PlaceArgs {
    /// Service date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<Date>,

    /// Time slot number, as listed by `slots`
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    slot: Option<u8>,

    /// Address id; defaults to the latest or first saved address
    #[arg(long)]
    address: Option<String>,

    /// Tip in rupees
    #[arg(long, default_value_t = 0)]
    tip: u64,

    /// Payment method
    #[arg(long, default_value = "cash")]
    payment_method: String,
}

pub(crate) async fn run(ctx: &AppContext, command: CheckoutCommand) -> Result<(), String> {
    match command.command {
        CheckoutSubcommand::Slots => {
            let today = Zoned::now().date();

            for date in available_dates(today) {
                println!("{date}");
            }
            println!();
            for (index, slot) in TIME_SLOTS.iter().enumerate() {
                println!("{}. {slot}", index + 1);
            }
        }
        CheckoutSubcommand::Quote { tip } => print_breakdown(&ctx.checkout.quote(tip)),
        CheckoutSubcommand::Place(args) => place(ctx, args).await?,
    }

    Ok(())
}

async fn place(ctx: &AppContext, args: PlaceArgs) -> Result<(), String> {
    let resolved = addresses::resolve(ctx).await;
    let latest = ctx.addresses.latest().map(|address| address.id);

    let address = match &args.address {
        Some(id) => resolved.get(&AddressId::new(id.as_str())).cloned(),
        None => resolved.preferred(latest.as_ref()).cloned(),
    };

    let time = args
        .slot
        .and_then(|slot| TIME_SLOTS.get(usize::from(slot).saturating_sub(1)))
        .map(ToString::to_string);

    let report = ctx
        .checkout
        .place_order(CheckoutRequest {
            date: args.date,
            time,
            address,
            tip: args.tip,
            payment_method: args.payment_method,
        })
        .await
        .map_err(|error| match error {
            CheckoutError::Invalid(errors) => errors
                .iter()
                .map(|(field, message)| format!("{field}: {message}"))
                .collect::<Vec<_>>()
                .join("\n"),
            other => other.to_string(),
        })?;

    println!(
        "{}",
        table::render(
            ["Service", "Qty", "Booking", "Result"],
            report.outcomes.iter().map(|outcome| {
                let (booking, result) = match &outcome.result {
                    BookingOutcome::Remote(booking) => (booking.id.to_string(), "booked".to_string()),
                    BookingOutcome::Local { booking, reason } => (
                        booking.id.to_string(),
                        format!("saved on this device ({reason})"),
                    ),
                    BookingOutcome::Failed { error, .. } => (String::new(), format!("failed: {error}")),
                };

                [
                    outcome.service_id.to_string(),
                    outcome.quantity.to_string(),
                    booking,
                    result,
                ]
            }),
            1..2,
        )
    );

    print_breakdown(&report.breakdown);

    if report.is_complete_success() {
        Ok(())
    } else {
        Err(format!(
            "{} of {} services could not be booked and are still in the cart",
            report.failed().count(),
            report.outcomes.len()
        ))
    }
}

fn print_breakdown(breakdown: &PriceBreakdown) {
    println!(
        "{}",
        table::render(
            ["", "Amount"],
            [
                ["Subtotal".to_string(), rupees(breakdown.subtotal).to_string()],
                ["Service fee".to_string(), rupees(breakdown.service_fee).to_string()],
                ["Taxes".to_string(), rupees(breakdown.taxes).to_string()],
                ["Tip".to_string(), rupees(breakdown.tip).to_string()],
                ["Total".to_string(), breakdown.total_money().to_string()],
            ],
            1..2,
        )
    );
}
