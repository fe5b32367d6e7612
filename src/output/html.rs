// HTML Report Generator

use crate::policy::report::{Report, Severity};
use crate::scanner::ScanSummary;
use crate::Result;
use handlebars::Handlebars;
use serde_json::json;
use std::fs;
use std::path::Path;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>tlscheck Scan Report</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #333; background: #f5f5f5; padding: 20px; }
        .container { max-width: 1100px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        h1 { color: #2c3e50; margin-bottom: 10px; }
        h2 { color: #34495e; margin-top: 30px; margin-bottom: 15px; padding-bottom: 10px; border-bottom: 2px solid #3498db; }
        .header { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 8px; margin-bottom: 30px; }
        .header h1 { color: white; }
        table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        th, td { padding: 10px 12px; text-align: left; border-bottom: 1px solid #ddd; }
        th { background: #34495e; color: white; }
        tr:hover { background: #f8f9fa; }
        .status-success { color: #27ae60; font-weight: bold; }
        .status-fail { color: #e74c3c; font-weight: bold; }
        .verdict-safe { background: #27ae60; color: white; padding: 4px 10px; border-radius: 4px; }
        .verdict-vulnerable { background: #e74c3c; color: white; padding: 4px 10px; border-radius: 4px; }
        .footer { margin-top: 40px; padding-top: 20px; border-top: 1px solid #ddd; color: #7f8c8d; text-align: center; }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>tlscheck Scan Report</h1>
            <div>Generated: {{timestamp}} | Targets: {{target_count}}</div>
        </div>

        {{#each reports}}
        <section>
            <h2>{{destination}} {{#if name}}({{name}}){{/if}}
                {{#if safe}}<span class="verdict-safe">SAFE</span>{{else}}<span class="verdict-vulnerable">VULNERABLE</span>{{/if}}
            </h2>
            <div>Profile: {{profile}}</div>
            <table>
                <thead><tr><th>Category</th><th>Status</th><th>Message</th></tr></thead>
                <tbody>
                {{#each messages}}
                    <tr>
                        <td>{{category}}</td>
                        <td>{{#if error}}<span class="status-fail">FAIL</span>{{else}}<span class="status-success">OK</span>{{/if}}</td>
                        <td>{{message}}</td>
                    </tr>
                {{/each}}
                </tbody>
            </table>
        </section>
        {{/each}}

        <div class="footer">Generated by tlscheck on top of O-Saft</div>
    </div>
</body>
</html>"#;

/// Render the whole batch as a standalone HTML document
pub fn render(summary: &ScanSummary) -> Result<String> {
    let handlebars = Handlebars::new();

    let reports: Vec<_> = summary.reports.iter().map(report_data).collect();
    let data = json!({
        "timestamp": chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        "target_count": summary.reports.len(),
        "reports": reports,
    });

    Ok(handlebars.render_template(HTML_TEMPLATE, &data)?)
}

/// Render and write the report file
pub fn export(summary: &ScanSummary, path: &Path) -> Result<()> {
    let html = render(summary)?;
    fs::write(path, html)?;
    Ok(())
}

fn report_data(report: &Report) -> serde_json::Value {
    let messages: Vec<_> = report
        .vulnerable_messages()
        .iter()
        .chain(report.safe_messages().iter())
        .map(|message| {
            json!({
                "category": message.category().label(),
                "error": message.severity() == Severity::Error,
                "message": message.message(),
            })
        })
        .collect();

    json!({
        "destination": report.target().destination(),
        "name": report.target().name(),
        "profile": report.target().profile_name(),
        "safe": report.is_safe(),
        "messages": messages,
    })
}
