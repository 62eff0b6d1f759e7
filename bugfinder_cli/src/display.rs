use colored::*;
use common::models::AnalysisResult;
use std::io::{self, Write};

pub fn render(analysis: &AnalysisResult, out: &mut impl Write) -> io::Result<()> {
    if analysis.is_buggy {
        writeln!(out, "{} {}", "✗".red(), "Bug Detected".red().bold())?;
    } else {
        writeln!(out, "{} {}", "✓".green(), "No Bugs Found".green().bold())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", "Analysis:".bold())?;
    writeln!(out, "{}", analysis.bug_description)?;
    writeln!(out)?;
    writeln!(out, "{}", "Suggested Fix:".bold())?;
    writeln!(out, "{}", analysis.suggested_fix.cyan())?;
    Ok(())
}
