//! Terminal rendering of display items for the one-shot CLI

use crate::output::{Action, DisplayItem, Icon};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Print items one per line, colored by kind
pub fn print_items(items: &[DisplayItem], color: bool) -> io::Result<()> {
    let choice = if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    write_items(&mut stdout, items)
}

/// Print items as a single JSON array
pub fn print_json(items: &[DisplayItem]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    serde_json::to_writer(&mut lock, items)?;
    writeln!(lock)?;
    Ok(())
}

fn write_items<W: WriteColor>(out: &mut W, items: &[DisplayItem]) -> io::Result<()> {
    for item in items {
        match item.icon {
            Icon::Match => write_match(out, item)?,
            Icon::Info => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                writeln!(out, "{}", item.name)?;
                out.reset()?;
            }
            Icon::Error => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(out, "error")?;
                out.reset()?;
                writeln!(out, ": {}", item.name)?;
            }
        }
    }
    Ok(())
}

/// Directory part dimmed, final component highlighted
fn write_match<W: WriteColor>(out: &mut W, item: &DisplayItem) -> io::Result<()> {
    let name = item.name.as_str();
    let trimmed = name.trim_end_matches('/');
    let split = trimmed.rfind('/').map(|i| i + 1).unwrap_or(0);

    if split > 0 {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Blue)))?;
        write!(out, "{}", &name[..split])?;
        out.reset()?;
    }

    let is_dir = matches!(
        &item.on_alt_enter,
        Some(Action::OpenPath { path }) if path.as_os_str() == trimmed
    );
    let mut spec = ColorSpec::new();
    spec.set_bold(true);
    if is_dir {
        spec.set_fg(Some(Color::Magenta));
    }
    out.set_color(&spec)?;
    write!(out, "{}", &name[split..])?;
    out.reset()?;
    writeln!(out)?;

    Ok(())
}
