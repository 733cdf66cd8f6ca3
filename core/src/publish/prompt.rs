use super::r#trait::Prompter;
use crate::error::PublishError;

/// Asks whether an existing deployment may be replaced.
///
/// Accepts `y`/`yes`/`n`/`no` in any case; anything else re-asks. Running out
/// of input is treated as a refusal to overwrite.
pub fn confirm_overwrite(prompter: &mut dyn Prompter, name: &str) -> Result<bool, PublishError> {
    let question = format!("The deployment {name} already exists, do you want to overwrite it y/n ? : ");
    loop {
        let Some(answer) = prompter.ask(&question)? else {
            return Err(PublishError::RemoteConflict(name.to_string()));
        };
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => prompter.say("Please answer y or n.")?,
        }
    }
}

/// Lists `profiles` sorted and numbered from 1 and returns the chosen one.
pub fn choose_profile(
    prompter: &mut dyn Prompter,
    profiles: &[String],
) -> Result<String, PublishError> {
    if profiles.is_empty() {
        return Err(PublishError::Config(
            "no project profile is available for this user".to_string(),
        ));
    }
    let mut sorted = profiles.to_vec();
    sorted.sort();

    prompter.say("Available project profiles:")?;
    for (i, name) in sorted.iter().enumerate() {
        prompter.say(&format!("{} - {}", i + 1, name))?;
    }

    loop {
        let question = format!("Select a project profile (1-{}): ", sorted.len());
        let Some(answer) = prompter.ask(&question)? else {
            return Err(PublishError::Prompt(
                "input ended before a project profile was selected".to_string(),
            ));
        };
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=sorted.len()).contains(&n) => return Ok(sorted[n - 1].clone()),
            _ => prompter.say("Invalid selection.")?,
        }
    }
}
