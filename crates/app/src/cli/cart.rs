use clap::{Args, Subcommand};
use homefix::{cart::Removal, catalog::ServiceId, pricing::rupees};
use homefix_app::context::AppContext;

use super::table;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart
    Show,

    /// Add one of a service
    Add {
        /// Service id
        service_id: String,
    },

    /// Take one of a service out
    Remove {
        /// Service id
        service_id: String,

        /// Drop the whole line
        #[arg(long)]
        all: bool,
    },

    /// Empty the cart
    Clear,
}

pub(crate) async fn run(ctx: &AppContext, command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Show => show(ctx),
        CartSubcommand::Add { service_id } => {
            let service = ctx
                .catalog
                .service(ServiceId::new(service_id.as_str()))
                .await
                .ok_or_else(|| format!("unknown service {service_id}"))?;

            let name = service.name.clone();
            let quantity = ctx.cart.add(service);

            println!("{name} × {quantity}");
        }
        CartSubcommand::Remove { service_id, all } => {
            let id = ServiceId::new(service_id.as_str());

            let removed = if all {
                ctx.cart.remove_line(&id).is_some()
            } else {
                ctx.cart.remove(&id) != Removal::Missing
            };

            if !removed {
                return Err(format!("{service_id} is not in the cart"));
            }

            show(ctx);
        }
        CartSubcommand::Clear => {
            ctx.cart.clear();
            println!("cart cleared");
        }
    }

    Ok(())
}

fn show(ctx: &AppContext) {
    let lines = ctx.cart.items();

    if lines.is_empty() {
        println!("cart is empty");
        return;
    }

    println!(
        "{}",
        table::render(
            ["Id", "Service", "Qty", "Price", "Total"],
            lines.iter().map(|line| {
                [
                    line.service.id.to_string(),
                    line.service.name.clone(),
                    line.quantity.to_string(),
                    rupees(line.service.price).to_string(),
                    rupees(line.line_total()).to_string(),
                ]
            }),
            2..5,
        )
    );
    println!(
        "{} items, {}",
        ctx.cart.total_items(),
        rupees(ctx.cart.total_price())
    );
}
