//! Server-side HTML rendering of the city table.

use cities_common::{Row, RowSet};

/// Shown in place of rows when nothing matched.
pub const NO_DATA: &str = "No data";

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_row(row: &Row) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape(&row.country),
        escape(&row.city),
        escape(&row.temperature.to_string())
    )
}

/// Render the table body rows.
pub fn render_rows(rows: &RowSet) -> String {
    match rows {
        RowSet::Rows(rows) if !rows.is_empty() => {
            rows.iter().map(render_row).collect::<Vec<_>>().join("\n")
        }
        _ => format!("<tr><td colspan=\"3\">{}</td></tr>", NO_DATA),
    }
}

/// Render the full page, with the current search term prefilled.
pub fn render_page(rows: &RowSet, search: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Cities</title>
</head>
<body>
<div class="cities-table-wrapper">
<h2>Countries and cities</h2>
<form method="get" action="/cities">
<input type="text" id="city-search" name="search" placeholder="Search city..." value="{search}">
</form>
<table id="cities-table" border="1" cellpadding="5" cellspacing="0">
<thead>
<tr><th>Country</th><th>City</th><th>Temperature</th></tr>
</thead>
<tbody>
{body}
</tbody>
</table>
</div>
</body>
</html>
"#,
        search = escape(search),
        body = render_rows(rows),
    )
}
