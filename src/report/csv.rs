use crate::types::CheckResult;

const HEADER: [&str; 6] = ["name", "type", "url", "status", "error_message", "check_time"];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push_str("\r\n");
}

pub fn render(results: &[CheckResult]) -> String {
    let mut out = String::new();
    push_row(&mut out, HEADER);
    for r in results {
        let time = r.check_time.format("%Y-%m-%d %H:%M:%S").to_string();
        push_row(
            &mut out,
            [
                r.name.as_str(),
                r.kind.as_str(),
                r.url.as_deref().unwrap_or(""),
                r.status.as_str(),
                r.error_message.as_deref().unwrap_or(""),
                time.as_str(),
            ],
        );
    }
    out
}
