use clap::{Args, Subcommand};
use homefix::{
    addresses::{AddressId, AddressType, NewAddress},
    provenance::ResolvedAddresses,
};
use homefix_app::{
    context::AppContext,
    domain::addresses::{AddressError, models::SavedAddress},
};

use super::table;

#[derive(Debug, Args)]
pub(crate) struct AddressesCommand {
    #[command(subcommand)]
    command: AddressesSubcommand,
}

#[derive(Debug, Subcommand)]
enum AddressesSubcommand {
    /// List addresses from the best available source
    List,

    /// Save a new address
    Add(AddressArgs),

    /// Replace an existing address
    Update {
        /// Address id
        id: String,

        #[command(flatten)]
        address: AddressArgs,
    },

    /// Delete an address
    Delete {
        /// Address id
        id: String,
    },
}

#[derive(Debug, Args)]
struct AddressArgs {
    /// Home, Work or Other
    #[arg(long = "type", default_value = "Home")]
    kind: AddressType,

    /// Street address
    #[arg(long)]
    address: String,

    /// City
    #[arg(long)]
    city: String,

    /// Six-digit pincode
    #[arg(long)]
    pincode: String,

    #[arg(long)]
    latitude: Option<f64>,

    #[arg(long)]
    longitude: Option<f64>,
}

impl From<AddressArgs> for NewAddress {
    fn from(args: AddressArgs) -> Self {
        Self {
            kind: args.kind,
            address: args.address,
            city: args.city,
            pincode: args.pincode,
            latitude: args.latitude,
            longitude: args.longitude,
        }
    }
}

/// Load addresses, seeding the in-memory source from the cached profile.
pub(crate) async fn resolve(ctx: &AppContext) -> ResolvedAddresses {
    let memory = ctx
        .profiles
        .cached()
        .map(|profile| profile.addresses)
        .unwrap_or_default();

    ctx.addresses.load(memory).await
}

pub(crate) async fn run(ctx: &AppContext, command: AddressesCommand) -> Result<(), String> {
    match command.command {
        AddressesSubcommand::List => {
            let resolved = resolve(ctx).await;
            let latest = ctx.addresses.latest().map(|address| address.id);

            let Some(provenance) = resolved.provenance else {
                println!("no saved addresses");
                return Ok(());
            };

            let preferred = resolved
                .preferred(latest.as_ref())
                .map(|address| address.id.clone());

            println!("from {provenance} storage");
            println!(
                "{}",
                table::render(
                    ["", "Id", "Type", "Address", "City", "Pincode"],
                    resolved.addresses.iter().map(|address| {
                        [
                            if Some(&address.id) == preferred.as_ref() {
                                "*".to_string()
                            } else {
                                String::new()
                            },
                            address.id.to_string(),
                            address.kind.to_string(),
                            address.address.clone(),
                            address.city.clone(),
                            address.pincode.to_string(),
                        ]
                    }),
                    0..0,
                )
            );
        }
        AddressesSubcommand::Add(args) => {
            let saved = ctx.addresses.create(args.into()).await.map_err(describe)?;
            report(&saved);
        }
        AddressesSubcommand::Update { id, address } => {
            let saved = ctx
                .addresses
                .update(AddressId::new(id), address.into())
                .await
                .map_err(describe)?;
            report(&saved);
        }
        AddressesSubcommand::Delete { id } => {
            ctx.addresses
                .delete(AddressId::new(id.as_str()))
                .await
                .map_err(describe)?;
            println!("deleted {id}");
        }
    }

    Ok(())
}

fn report(saved: &SavedAddress) {
    let address = saved.address();

    match saved {
        SavedAddress::Remote(_) => println!("saved {}", address.id),
        SavedAddress::Local { .. } if saved.denied_by_policy() => {
            println!("saved {} locally due to permission settings", address.id);
        }
        SavedAddress::Local { reason, .. } => match reason {
            Some(reason) => println!("saved {} on this device ({reason})", address.id),
            None => println!("saved {} on this device", address.id),
        },
    }
}

fn describe(error: AddressError) -> String {
    match error {
        AddressError::Invalid(errors) => errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}
