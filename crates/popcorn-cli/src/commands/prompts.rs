use color_eyre::Result;
use dialoguer::{Confirm, Input};

/// Prompt for a string value with optional default
pub fn prompt_string(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_builder = Input::<String>::new().with_prompt(prompt).allow_empty(true);

    if let Some(default_value) = default {
        input_builder = input_builder.default(default_value.to_string());
    }

    input_builder
        .interact_text()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read input: {}", e))
}

/// Prompt for a secret without echoing it
pub fn prompt_secret(prompt: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", prompt))
        .map(|s| s.trim().to_string())
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read secret: {}", e))
}

/// Prompt for yes/no with optional default
pub fn prompt_yes_no(prompt: &str, default: Option<bool>) -> Result<bool> {
    let mut confirm_builder = Confirm::new().with_prompt(prompt);

    if let Some(default_value) = default {
        confirm_builder = confirm_builder.default(default_value);
    }

    confirm_builder
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}

/// Prompt for a positive number, re-asking until the input parses
pub fn prompt_positive(prompt: &str, default: u64) -> Result<u64> {
    loop {
        let input = prompt_string(prompt, Some(&default.to_string()))?;
        match parse_positive(&input, default) {
            Some(n) => return Ok(n),
            None => eprintln!("Invalid input. Please enter a number greater than zero."),
        }
    }
}

fn parse_positive(input: &str, default: u64) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(default);
    }
    trimmed.parse::<u64>().ok().filter(|n| *n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("", 500), Some(500));
        assert_eq!(parse_positive(" 250 ", 500), Some(250));
        assert_eq!(parse_positive("0", 500), None);
        assert_eq!(parse_positive("fast", 500), None);
    }
}
