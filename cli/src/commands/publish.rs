use dagen_core::api as core_api;

use crate::commands::cli::PublishArgs;
use crate::prompt::TerminalPrompter;

pub async fn handle_publish(
    args: PublishArgs,
    cfg: &core_api::AppConfig,
) -> Result<i32, core_api::CliError> {
    let api = dagen_plugins::factory::build_deployment_api(&cfg.api)
        .map_err(|e| core_api::CliError::Config(e.to_string()))?;

    let user_id = args
        .user_id
        .unwrap_or_else(|| cfg.api.user_id.clone());
    let opts = core_api::PublishOptions {
        project_profile: args.profile.or_else(|| cfg.api.project_profile.clone()),
        user_id,
        assume_yes: args.yes,
    };

    let stdin = std::io::stdin();
    let mut prompter = TerminalPrompter::new(stdin.lock(), std::io::stdout());
    match core_api::publish(&args.spec, api.as_ref(), &mut prompter, opts).await? {
        core_api::PublishOutcome::Published { message } => println!("{message}"),
        core_api::PublishOutcome::Declined => println!("Publish cancelled, nothing was sent."),
    }
    Ok(0)
}
