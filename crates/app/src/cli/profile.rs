use clap::{Args, Subcommand};
use homefix::profiles::UserProfile;
use homefix_app::context::AppContext;

#[derive(Debug, Args)]
pub(crate) struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProfileSubcommand {
    /// Load and show the signed-in profile
    Show,

    /// Start offering services
    BecomeProvider,
}

pub(crate) async fn run(ctx: &AppContext, command: ProfileCommand) -> Result<(), String> {
    match command.command {
        ProfileSubcommand::Show => {
            let profile = match ctx.profiles.load().await {
                Some(profile) => profile,
                None => ctx
                    .profiles
                    .cached()
                    .ok_or_else(|| "not signed in".to_string())?,
            };

            print_profile(&profile);
        }
        ProfileSubcommand::BecomeProvider => {
            let profile = ctx
                .profiles
                .become_provider()
                .await
                .map_err(|error| format!("failed to become a provider: {error}"))?;

            print_profile(&profile);
        }
    }

    Ok(())
}

fn print_profile(profile: &UserProfile) {
    println!("id: {}", profile.id);
    println!("name: {}", profile.full_name);
    println!("email: {}", profile.email);
    println!("role: {}", profile.role);
    if let Some(phone) = &profile.phone {
        println!("phone: {phone}");
    }
}
