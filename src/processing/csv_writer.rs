use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Write named columns to a CSV file. Columns may have different lengths;
/// short columns leave trailing cells empty.
pub fn write_columns<P: AsRef<Path>>(path: P, columns: &[(&str, Vec<f64>)]) -> io::Result<()> {
    let mut file = File::create(path)?;

    let headers: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
    writeln!(file, "{}", headers.join(","))?;

    let rows = columns.iter().map(|(_, data)| data.len()).max().unwrap_or(0);
    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .map(|(_, data)| match data.get(row) {
                Some(value) => format!("{value:.15e}"),
                None => String::new(),
            })
            .collect();
        writeln!(file, "{}", cells.join(","))?;
    }

    Ok(())
}

/// Write a solver iteration history (iteration, |residual|).
pub fn write_history<P: AsRef<Path>>(path: P, history: &[(u32, f64)]) -> io::Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "iter,residual")?;
    for (iteration, residual) in history {
        writeln!(file, "{iteration},{residual:e}")?;
    }
    Ok(())
}
