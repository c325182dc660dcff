use humansize::{DECIMAL, format_size};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::generate::WrittenFile;

/// Renders one row per written file, sorted by port and table.
pub fn render_summary(files: &[WrittenFile]) -> String {
    let mut rows = files.iter().collect::<Vec<_>>();
    rows.sort_by(|a, b| (a.port, &a.table).cmp(&(b.port, &b.table)));

    let mut builder = Builder::default();
    builder.push_record(["Port", "Table", "Tuples", "Present", "Pages", "Size"]);
    for file in rows {
        builder.push_record([
            file.port.to_string(),
            file.table.clone(),
            file.summary.tuple_count.to_string(),
            file.summary.present_count.to_string(),
            file.summary.page_count.to_string(),
            format_size(file.summary.bytes_written, DECIMAL),
        ]);
    }

    let total: u64 = files.iter().map(|f| f.summary.bytes_written).sum();
    builder.push_record([
        String::new(),
        "total".to_owned(),
        String::new(),
        String::new(),
        String::new(),
        format_size(total, DECIMAL),
    ]);

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use heapfile::WriteSummary;

    use super::*;

    #[test]
    fn rows_sorted_by_port() {
        let file = |port, table: &str, bytes| WrittenFile {
            table: table.to_owned(),
            port,
            path: PathBuf::from(format!("child/{port}/{table}.dat")),
            summary: WriteSummary {
                tuple_count: 3,
                present_count: 2,
                page_count: 1,
                bytes_written: bytes,
            },
        };
        let rendered = render_summary(&[file(9999, "test.0", 4096), file(8001, "test.0", 2000)]);

        let first = rendered.find("8001").unwrap();
        let second = rendered.find("9999").unwrap();
        assert!(first < second);
        assert!(rendered.contains("4.1"));
        assert!(rendered.contains("6.1"));
    }
}
