//! Self-contained HTML report: summary cards, two Chart.js charts and a filterable
//! results table.

use std::collections::BTreeSet;

use serde_json::json;

use crate::html::{escape, truncate};
use crate::summary::Summary;
use crate::types::CheckResult;

const URL_DISPLAY_MAX: usize = 60;
const CHART_JS: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.0/dist/chart.umd.min.js";

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif;
  background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; padding: 20px; color: #333; }
.container { max-width: 1400px; margin: 0 auto; background: #fff; border-radius: 20px;
  box-shadow: 0 20px 60px rgba(0,0,0,.3); overflow: hidden; }
.header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: #fff; padding: 40px; text-align: center; }
.header h1 { font-size: 2.5em; margin-bottom: 10px; }
.summary-cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; padding: 30px; background: #f8f9fa; }
.card { background: #fff; border-radius: 15px; padding: 25px; box-shadow: 0 4px 6px rgba(0,0,0,.1); }
.card-title { font-size: .9em; color: #666; text-transform: uppercase; letter-spacing: 1px; margin-bottom: 10px; }
.card-value { font-size: 2.5em; font-weight: 700; }
.card.total .card-value { color: #3498db; }
.card.working .card-value { color: #27ae60; }
.card.broken .card-value { color: #e74c3c; }
.charts-section { display: grid; grid-template-columns: repeat(auto-fit, minmax(400px, 1fr)); gap: 30px; padding: 30px; }
.chart-container { background: #fff; border-radius: 15px; padding: 25px; box-shadow: 0 4px 6px rgba(0,0,0,.1); }
.chart-container h2 { margin-bottom: 20px; font-size: 1.5em; }
.tables-section { padding: 30px; }
.table-container { border-radius: 15px; overflow: hidden; box-shadow: 0 4px 6px rgba(0,0,0,.1); }
.table-header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: #fff; padding: 20px 25px; font-size: 1.3em; font-weight: 600; }
.filter-controls { padding: 15px 25px; background: #f8f9fa; border-bottom: 1px solid #dee2e6; display: flex; gap: 15px; flex-wrap: wrap; align-items: center; }
.filter-controls label { font-weight: 600; }
.filter-controls select, .filter-controls input { padding: 8px 12px; border: 1px solid #dee2e6; border-radius: 5px; }
.table-wrapper { overflow-x: auto; }
table { width: 100%; border-collapse: collapse; }
th { padding: 15px; text-align: left; border-bottom: 2px solid #dee2e6; position: sticky; top: 0; background: #f8f9fa; }
td { padding: 12px 15px; border-bottom: 1px solid #dee2e6; }
tbody tr:hover { background-color: #f8f9fa; }
.status-badge { display: inline-block; padding: 5px 12px; border-radius: 20px; font-size: .85em; font-weight: 600; text-transform: uppercase; }
.status-working { background: #d4edda; color: #155724; }
.status-broken { background: #f8d7da; color: #721c24; }
.url-cell { max-width: 400px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.url-link { color: #3498db; text-decoration: none; }
.error-cell { max-width: 300px; font-size: .9em; color: #666; }
@media (max-width: 768px) { .charts-section, .summary-cards { grid-template-columns: 1fr; } }
"#;

const SCRIPT: &str = r#"
function filterTable() {
  const type = document.getElementById('typeFilter').value.toLowerCase();
  const status = document.getElementById('statusFilter').value.toLowerCase();
  const search = document.getElementById('searchInput').value.toLowerCase();
  for (const row of document.querySelectorAll('#resultsTable tbody tr')) {
    const show = (!type || (row.dataset.type || '') === type)
      && (!status || (row.dataset.status || '') === status)
      && (!search || (row.textContent || '').toLowerCase().includes(search));
    row.style.display = show ? '' : 'none';
  }
}
function drawCharts(data) {
  new Chart(document.getElementById('statusChart'), {
    type: 'doughnut',
    data: { labels: ['Working', 'Broken'],
      datasets: [{ data: [data.working, data.broken], backgroundColor: ['#27ae60', '#e74c3c'], borderWidth: 0 }] },
    options: { responsive: true, plugins: { legend: { position: 'bottom' },
      tooltip: { callbacks: { label: (c) => {
        const pct = data.total ? ((c.parsed / data.total) * 100).toFixed(1) : '0.0';
        return `${c.label}: ${c.parsed} (${pct}%)`;
      } } } } }
  });
  new Chart(document.getElementById('typeChart'), {
    type: 'bar',
    data: { labels: data.types,
      datasets: [
        { label: 'Working', data: data.typeWorking, backgroundColor: '#27ae60', borderRadius: 5 },
        { label: 'Broken', data: data.typeBroken, backgroundColor: '#e74c3c', borderRadius: 5 },
      ] },
    options: { responsive: true, plugins: { legend: { position: 'top' }, tooltip: { mode: 'index', intersect: false } },
      scales: { x: { grid: { display: false } }, y: { beginAtZero: true, ticks: { stepSize: 1 } } } }
  });
}
"#;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// JSON for embedding inside a `<script>` element.
fn script_json(value: &serde_json::Value) -> String { value.to_string().replace("</", "<\\/") }

fn chart_data(summary: &Summary) -> serde_json::Value {
    let types: Vec<String> = summary.by_type.keys().map(|k| capitalize(k.as_str())).collect();
    let working: Vec<usize> = summary.by_type.values().map(|t| t.working).collect();
    let broken: Vec<usize> = summary.by_type.values().map(|t| t.broken).collect();
    json!({
        "total": summary.total,
        "working": summary.working,
        "broken": summary.broken,
        "types": types,
        "typeWorking": working,
        "typeBroken": broken,
    })
}

fn card(out: &mut String, class: &str, title: &str, value: &str) {
    out.push_str(&format!(
        "<div class=\"card {}\"><div class=\"card-title\">{}</div><div class=\"card-value\">{}</div></div>\n",
        class, title, value
    ));
}

fn row(out: &mut String, r: &CheckResult) {
    let kind = escape(r.kind.as_str());
    let status = r.status.as_str();
    let url = r.url.as_deref().unwrap_or("");
    let message = r.error_message.as_deref().filter(|m| !m.is_empty()).map(escape).unwrap_or_else(|| "-".to_string());
    out.push_str(&format!(
        "<tr data-type=\"{kind}\" data-status=\"{status}\">\
<td><strong>{name}</strong></td><td>{kind_label}</td>\
<td><span class=\"status-badge status-{status}\">{status_label}</span></td>\
<td class=\"url-cell\"><a href=\"{href}\" target=\"_blank\" class=\"url-link\" title=\"{href}\">{shown}</a></td>\
<td class=\"error-cell\">{message}</td><td>{time}</td></tr>\n",
        kind = kind,
        status = status,
        name = escape(&r.name),
        kind_label = escape(&capitalize(r.kind.as_str())),
        status_label = capitalize(status),
        href = escape(url),
        shown = escape(&truncate(url, URL_DISPLAY_MAX)),
        message = message,
        time = r.check_time.format("%Y-%m-%d %H:%M:%S"),
    ));
}

pub fn render(results: &[CheckResult], summary: &Summary) -> String {
    let generated = summary.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
    let mut out = String::with_capacity(16 * 1024 + results.len() * 512);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    out.push_str(&format!("<title>Content Check Report - {}</title>\n", generated));
    out.push_str(&format!("<script src=\"{}\"></script>\n<style>{}</style>\n</head>\n<body>\n", CHART_JS, STYLE));
    out.push_str("<div class=\"container\">\n<div class=\"header\"><h1>Content Check Report</h1>");
    out.push_str(&format!("<p>Generated on {}</p></div>\n", generated));

    out.push_str("<div class=\"summary-cards\">\n");
    card(&mut out, "total", "Total Items", &summary.total.to_string());
    card(&mut out, "working", "Working", &summary.working.to_string());
    card(&mut out, "broken", "Broken", &summary.broken.to_string());
    card(&mut out, "", "Success Rate", &format!("{:.1}%", summary.success_rate()));
    out.push_str("</div>\n");

    out.push_str(
        "<div class=\"charts-section\">\
<div class=\"chart-container\"><h2>Status Overview</h2><canvas id=\"statusChart\"></canvas></div>\
<div class=\"chart-container\"><h2>Status by Type</h2><canvas id=\"typeChart\"></canvas></div></div>\n",
    );

    let kinds: BTreeSet<&str> = results.iter().map(|r| r.kind.as_str()).collect();
    out.push_str("<div class=\"tables-section\"><div class=\"table-container\">\n<div class=\"table-header\">All Results</div>\n");
    out.push_str("<div class=\"filter-controls\">\n<label for=\"typeFilter\">Filter by Type:</label>\n");
    out.push_str("<select id=\"typeFilter\" onchange=\"filterTable()\"><option value=\"\">All Types</option>");
    for kind in kinds {
        out.push_str(&format!("<option value=\"{}\">{}</option>", escape(kind), escape(&capitalize(kind))));
    }
    out.push_str("</select>\n<label for=\"statusFilter\">Filter by Status:</label>\n");
    out.push_str(
        "<select id=\"statusFilter\" onchange=\"filterTable()\"><option value=\"\">All Statuses</option>\
<option value=\"working\">Working</option><option value=\"broken\">Broken</option></select>\n",
    );
    out.push_str(
        "<label for=\"searchInput\">Search:</label>\n\
<input type=\"text\" id=\"searchInput\" onkeyup=\"filterTable()\" placeholder=\"Search by name or URL...\">\n</div>\n",
    );
    out.push_str(
        "<div class=\"table-wrapper\"><table id=\"resultsTable\"><thead><tr>\
<th>Name</th><th>Type</th><th>Status</th><th>URL</th><th>Error Message</th><th>Check Time</th>\
</tr></thead>\n<tbody>\n",
    );
    for r in results {
        row(&mut out, r);
    }
    out.push_str("</tbody></table></div></div></div>\n</div>\n");

    out.push_str(&format!(
        "<script>{}\ndrawCharts({});\n</script>\n</body>\n</html>\n",
        SCRIPT,
        script_json(&chart_data(summary))
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentItem, ContentType, Verdict};

    fn render_one(item: ContentItem, verdict: Verdict) -> String {
        let results = vec![CheckResult::from_verdict(&item, verdict)];
        render(&results, &Summary::from_results(&results))
    }

    #[test]
    fn escapes_interpolated_values() {
        let item = ContentItem::new(ContentType::Movie, "<script>alert(1)</script>", Some("https://x/?a=1&b=\"2\"".into()));
        let page = render_one(item, Verdict::broken("bad <b>"));
        assert!(!page.contains("<script>alert(1)"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("href=\"https://x/?a=1&amp;b=&quot;2&quot;\""));
        assert!(page.contains("bad &lt;b&gt;"));
    }

    #[test]
    fn long_urls_are_truncated_for_display_only() {
        let url = format!("https://cdn.example/{}", "a".repeat(80));
        let page = render_one(ContentItem::new(ContentType::Channel, "Long", Some(url.clone())), Verdict::working());
        assert!(page.contains(&format!("title=\"{}\"", url)));
        assert!(page.contains(&format!(">{}...</a>", &url[..URL_DISPLAY_MAX])));
        assert!(page.contains("<td class=\"error-cell\">-</td>"));
    }

    #[test]
    fn has_charts_filters_and_type_options() {
        let page = render_one(ContentItem::new(ContentType::Radio, "R", Some("http://r".into())), Verdict::working());
        assert!(page.contains("id=\"statusChart\"") && page.contains("id=\"typeChart\""));
        assert!(page.contains("<option value=\"radio\">Radio</option>"));
        assert!(page.contains("\"types\":[\"Radio\"]"));
        assert!(page.contains("100.0%"));
    }
}
