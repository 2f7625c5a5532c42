use crate::action::Action;
use crate::args::ProfileArgs;
use crate::commands::{ensure_saved, open, shout, Out};
use crate::model::{AppState, Voucher};
use crate::{Config, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The branding printed at the top of a statement.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub main_title: String,
    pub sub_title: String,
    /// Size in bytes of the stored logo, `None` when there is no logo.
    pub logo_bytes: Option<usize>,
    pub last_backup: Option<DateTime<Utc>>,
}

impl Profile {
    fn of(state: &AppState) -> Self {
        let logo = state.logo();
        Self {
            main_title: state.main_title().to_string(),
            sub_title: state.sub_title().to_string(),
            logo_bytes: (!logo.is_empty()).then(|| logo.len()),
            last_backup: state.last_backup(),
        }
    }
}

/// Shows the statement branding, changing any of the titles or the logo that were given first.
/// Titles are stored in upper case.
///
/// # Errors
/// - Returns an error if the logo file cannot be read or if the ledger cannot be saved.
pub async fn profile(config: Config, args: ProfileArgs) -> Result<Out<Profile>> {
    let mut ledger = open(&config).await;
    let unchanged = args.main_title().is_none()
        && args.sub_title().is_none()
        && args.logo().is_none()
        && !args.clear_logo();
    if unchanged {
        let profile = Profile::of(ledger.state());
        return Ok(Out::new(render(&profile), profile));
    }

    let state = ledger.state();
    let main_title = args
        .main_title()
        .map(shout)
        .unwrap_or_else(|| state.main_title().to_string());
    let sub_title = args
        .sub_title()
        .map(shout)
        .unwrap_or_else(|| state.sub_title().to_string());
    let logo = match args.logo() {
        Some(path) => Voucher::from_file(path).await?,
        None if args.clear_logo() => Voucher::default(),
        None => state.logo().clone(),
    };

    let status = ledger
        .dispatch(Action::UpdateProfile {
            main_title,
            sub_title,
            logo,
        })
        .await?;
    ensure_saved(status)?;
    let profile = Profile::of(ledger.state());
    Ok(Out::new(
        format!("Updated the profile\n{}", render(&profile)),
        profile,
    ))
}

fn render(profile: &Profile) -> String {
    let logo = match profile.logo_bytes {
        Some(n) => format!("{n} bytes"),
        None => "none".to_string(),
    };
    let backup = match profile.last_backup {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "never".to_string(),
    };
    format!(
        "Main title:  {}\nSub title:   {}\nLogo:        {logo}\nLast saved:  {backup}",
        profile.main_title, profile.sub_title
    )
}
