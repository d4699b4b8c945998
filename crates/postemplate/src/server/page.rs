//! Single-page HTML front end for the upload form and the download hand-off.

pub enum PageView<'a> {
    Upload { notice: Option<&'a str> },
    Ready {
        token: &'a str,
        filename: &'a str,
        uncategorized: bool,
    },
}

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 50px; background-color: #f4f4f9; color: #333; }
    .container { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 4px 8px rgba(0,0,0,0.1); max-width: 600px; margin: auto; }
    h1 { color: #007bff; border-bottom: 2px solid #eee; padding-bottom: 10px; text-align: center; }
    form { display: flex; flex-direction: column; }
    input[type="file"] { border: 1px solid #ccc; padding: 10px; border-radius: 4px; margin-bottom: 20px; }
    button, .button { background-color: #28a745; color: white; padding: 12px 20px; border: none; border-radius: 4px; cursor: pointer; font-size: 16px; text-align: center; text-decoration: none; }
    .button.secondary { background-color: #007bff; margin-top: 10px; }
    .success { background-color: #d4edda; color: #155724; padding: 15px; margin-bottom: 20px; border: 1px solid #c3e6cb; border-radius: 5px; text-align: center; font-weight: bold; }
    .warning { background-color: #f8d7da; color: #721c24; padding: 10px; margin-bottom: 20px; border: 1px solid #f5c6cb; border-radius: 4px; }
    .note { background-color: #fff3cd; color: #856404; padding: 10px; border: 1px solid #ffeeba; border-radius: 4px; margin-top: 15px; }
    #ready { display: flex; flex-direction: column; align-items: center; }
"#;

pub const UNCATEGORIZED_WARNING: &str =
    "Some items were not found in the reference dataset and were marked UNCATEGORIZED. \
     Review the Pos Categories column before importing.";

pub fn render(view: &PageView<'_>) -> String {
    let mut body = String::new();

    match view {
        PageView::Upload { notice } => {
            if let Some(notice) = notice {
                body.push_str(&format!(r#"<div class="warning">{}</div>"#, escape(notice)));
            }
            body.push_str(
                r#"<form method="POST" enctype="multipart/form-data" action="/">
            <input type="file" name="file" accept=".xlsx,.xls" required>
            <button type="submit">Proceed and Generate New CSV File</button>
        </form>"#,
            );
        }
        PageView::Ready {
            token,
            filename,
            uncategorized,
        } => {
            body.push_str(r#"<div id="ready">"#);
            body.push_str(r#"<div class="success">File successfully processed.</div>"#);
            if *uncategorized {
                body.push_str(&format!(
                    r#"<div class="warning">{}</div>"#,
                    escape(UNCATEGORIZED_WARNING)
                ));
            }
            body.push_str(&format!(
                r#"<a class="button" href="/download/{token}" download="{name}">Download {name}</a>"#,
                token = escape(token),
                name = escape(filename),
            ));
            body.push_str(r#"<a class="button secondary" href="/">Generate New File</a>"#);
            body.push_str("</div>");
        }
    }

    format!(
        r#"<!doctype html>
<html>
<head>
    <meta charset="utf-8">
    <title>Branch POS template</title>
    <style>{STYLE}</style>
</head>
<body>
    <div class="container">
        <h1>POS Template Generator</h1>
        {body}
        <div class="note">
            <strong>Generated template note:</strong> The generated CSV file fills in the columns required for importing POS products. Modify columns if needed.
        </div>
    </div>
</body>
</html>
"#
    )
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
