use std::fmt::Write;

const NOT_SPECIFIED: &str = "Not specified";

/// Everything the company sees about a new application.
#[derive(Debug, Default)]
pub struct ApplicationNotice {
    pub company_name: String,
    pub position: String,
    pub student_name: String,
    pub student_email: String,
    pub phone: String,
    pub institution: Option<String>,
    pub course: Option<i32>,
    pub specialization: String,
    pub bio: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub resume_url: Option<String>,
    pub comment: String,
}

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}

/// Minimal HTML escaping for text placed inside element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

impl ApplicationNotice {
    pub fn subject(&self) -> String {
        format!("New internship application: {}", self.position)
    }

    fn course_label(&self) -> String {
        self.course
            .map(|c| format!("Year {c}"))
            .unwrap_or_else(|| NOT_SPECIFIED.to_string())
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Email", self.student_email.clone()),
            ("Phone", or_unspecified(&self.phone).to_string()),
            (
                "Institution",
                self.institution
                    .clone()
                    .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
            ),
            ("Course", self.course_label()),
            ("Specialization", or_unspecified(&self.specialization).to_string()),
        ]
    }

    fn extras(&self) -> Vec<(&'static str, String)> {
        let mut extras = Vec::new();
        if !self.bio.trim().is_empty() {
            extras.push(("About", self.bio.clone()));
        }
        if !self.skills.is_empty() {
            extras.push(("Skills", self.skills.join(", ")));
        }
        if !self.interests.is_empty() {
            extras.push(("Interests", self.interests.join(", ")));
        }
        extras
    }

    pub fn text_body(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "New application from {} for the position \"{}\" at {}.\n",
            self.student_name, self.position, self.company_name
        );
        let _ = writeln!(out, "Student");
        for (label, value) in self.details().into_iter().chain(self.extras()) {
            let _ = writeln!(out, "  {label}: {value}");
        }
        if let Some(url) = &self.resume_url {
            let _ = writeln!(out, "  Resume: {url}");
        }
        let _ = writeln!(out, "\nComment");
        let _ = writeln!(out, "  {}", or_unspecified(&self.comment));
        out
    }

    pub fn html_body(&self) -> String {
        let mut rows = String::new();
        for (label, value) in self.details().into_iter().chain(self.extras()) {
            let _ = write!(
                rows,
                "<p><strong>{label}:</strong> {}</p>",
                escape_html(&value)
            );
        }
        if let Some(url) = &self.resume_url {
            let url = escape_html(url);
            let _ = write!(
                rows,
                "<p><strong>Resume:</strong> <a href=\"{url}\">{url}</a></p>"
            );
        }

        format!(
            r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>New internship application</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="font-size: 22px;">New internship application</h1>
  <h2>{student}</h2>
  {rows}
  <h2>Application</h2>
  <p><strong>Company:</strong> {company}</p>
  <p><strong>Position:</strong> {position}</p>
  <blockquote style="border-left: 4px solid #667eea; padding-left: 12px;">{comment}</blockquote>
  <p style="color: #666; font-size: 13px;">This message was sent automatically.</p>
</body>
</html>"#,
            student = escape_html(&self.student_name),
            company = escape_html(&self.company_name),
            position = escape_html(&self.position),
            comment = escape_html(or_unspecified(&self.comment)),
        )
    }
}
