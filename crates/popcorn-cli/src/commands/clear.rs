use super::AppContext;
use crate::output::Output;
use color_eyre::Result;

pub fn run_clear(all: bool, watched: bool, credentials: bool, output: &Output) -> Result<()> {
    let mut ctx = AppContext::load()?;

    if all {
        clear_watched(&ctx, output)?;
        clear_credentials(&mut ctx, output)?;
        output.success("Watched list and credentials cleared");
        return Ok(());
    }

    let mut cleared_anything = false;

    if watched {
        clear_watched(&ctx, output)?;
        cleared_anything = true;
    }

    if credentials {
        clear_credentials(&mut ctx, output)?;
        cleared_anything = true;
    }

    if !cleared_anything {
        output.warn("No clear option specified. Use --watched, --credentials, or --all");
        output.info("\nExample: popcorn clear --watched");
    }

    Ok(())
}

fn clear_watched(ctx: &AppContext, output: &Output) -> Result<()> {
    let storage = ctx.storage();
    let key = &ctx.config.storage.watched_key;
    let path = storage.path_for(key);

    let removed = storage
        .remove(key)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to remove watched list at {}: {}", path.display(), e))?;
    if removed {
        output.success(format!("Cleared watched list: {}", path.display()));
    } else {
        output.info("No watched list found to clear");
    }
    Ok(())
}

fn clear_credentials(ctx: &mut AppContext, output: &Output) -> Result<()> {
    let credentials_file = ctx.paths.credentials_file();
    let removed = ctx.credentials.clear().map_err(|e| {
        color_eyre::eyre::eyre!(
            "Failed to remove credentials file at {}: {}",
            credentials_file.display(),
            e
        )
    })?;
    if removed {
        output.success(format!("Cleared credentials: {}", credentials_file.display()));
    } else {
        output.info("No credentials file found to clear");
    }

    Ok(())
}
