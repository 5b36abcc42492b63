use anyhow::Result;
use basecal_core::schema::view_options;

/// Print the view options the host shows for a calendar view.
pub fn run() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&view_options())?);
    Ok(())
}
