use itertools::Itertools;

/// Render rows as a left-aligned text table with a header line.
pub fn render_table(title: &str, header: &[&str], rows: &[Vec<String>]) -> String {
    let widths = (0..header.len())
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain([header[col].len()])
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    let mut out = vec![title.to_string(), line(header.iter().copied(), &widths)];
    out.push(widths.iter().map(|w| "-".repeat(*w)).join("-+-"));
    out.extend(
        rows.iter()
            .map(|row| line(row.iter().map(String::as_str), &widths)),
    );

    out.join("\n")
}

fn line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .join(" | ")
        .trim_end()
        .to_string()
}
