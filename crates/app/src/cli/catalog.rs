use clap::{Args, Subcommand};
use homefix::{
    catalog::{ServiceId, ServiceSnapshot},
    pricing::rupees,
};
use homefix_app::context::AppContext;

use super::table;

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List every category and its services
    List {
        /// Only this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Find services by name or category
    Search {
        /// Text to look for
        term: String,
    },

    /// Show one service with current details
    Show {
        /// Service id
        service_id: String,
    },
}

pub(crate) async fn run(ctx: &AppContext, command: CatalogCommand) -> Result<(), String> {
    match command.command {
        CatalogSubcommand::List { category } => {
            let categories = match category {
                Some(id) => vec![
                    ctx.catalog
                        .category(&id)
                        .ok_or_else(|| format!("unknown category {id}"))?,
                ],
                None => ctx.catalog.categories(),
            };

            for category in categories {
                println!("{} ({})", category.name, category.id);
                println!("{}", services_table(&category.services));
            }
        }
        CatalogSubcommand::Search { term } => {
            let found = ctx.catalog.search(&term);

            if found.is_empty() {
                println!("no services match {term:?}");
            } else {
                println!("{}", services_table(&found));
            }
        }
        CatalogSubcommand::Show { service_id } => {
            let service = ctx
                .catalog
                .service(ServiceId::new(service_id.as_str()))
                .await
                .ok_or_else(|| format!("unknown service {service_id}"))?;

            println!("{} ({})", service.name, service.id);
            println!("category: {}", service.category);
            println!("price: {}", rupees(service.price));
            println!("rating: {:.1}", service.rating);
            if let Some(duration) = &service.duration {
                println!("duration: {duration}");
            }
            println!("{}", service.description);
        }
    }

    Ok(())
}

fn services_table(services: &[ServiceSnapshot]) -> String {
    table::render(
        ["Id", "Service", "Category", "Rating", "Price"],
        services.iter().map(|service| {
            [
                service.id.to_string(),
                service.name.clone(),
                service.category.clone(),
                format!("{:.1}", service.rating),
                rupees(service.price).to_string(),
            ]
        }),
        3..5,
    )
}
