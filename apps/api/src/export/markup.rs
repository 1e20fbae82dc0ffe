//! Word-compatible HTML rendering of a resume.
//!
//! Produces a self-contained document with an embedded style sheet. Word processors open it
//! when saved with a `.doc` extension and `application/msword` type. Every user value passes
//! through `escape` before it reaches the markup.

use std::borrow::Cow;
use std::fmt::Write;

use crate::export::strip_control_chars;
use crate::models::resume::ResumeDocument;

const STYLE_SHEET: &str = "\
    body { font-family: Arial, sans-serif; margin: 40px; line-height: 1.6; }
    h1 { font-size: 28px; margin-bottom: 10px; color: #333; }
    h2 { font-size: 20px; border-bottom: 2px solid #333; padding-bottom: 5px; margin-top: 20px; }
    .contact-info { margin-bottom: 20px; color: #666; }
    .section { margin-bottom: 25px; }
    .experience-item, .education-item, .project-item { margin-bottom: 15px; }
    .job-title { font-weight: bold; font-size: 16px; }
    .company { color: #555; }
    .date { color: #888; float: right; }
    ul { margin: 5px 0; padding-left: 20px; }";

/// Serializes a document into a complete styled HTML document.
pub fn serialize(doc: &ResumeDocument) -> String {
    let info = &doc.personal_info;
    let mut html = String::with_capacity(4096);

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\">\n<title>{} - Resume</title>\n\
         <style>\n{STYLE_SHEET}\n</style>\n</head>\n<body>\n",
        escape(&info.full_name)
    );

    let _ = write!(html, "<h1>{}</h1>", escape(&info.full_name));
    let mut contact = vec![
        escape(&info.email),
        escape(&info.phone),
        escape(&info.location),
    ];
    for optional in [&info.linkedin, &info.website] {
        if !optional.is_empty() {
            contact.push(escape(optional));
        }
    }
    let _ = write!(html, "<div class=\"contact-info\">{}</div>", contact.join(" | "));

    if !info.summary.is_empty() {
        open_section(&mut html, "Professional Summary");
        let _ = write!(html, "<p>{}</p>", escape_block(&info.summary));
        close_section(&mut html);
    }

    if !doc.experience.is_empty() {
        open_section(&mut html, "Work Experience");
        for exp in &doc.experience {
            html.push_str("<div class=\"experience-item\">");
            let _ = write!(html, "<div class=\"job-title\">{}</div>", escape(&exp.position));
            let _ = write!(html, "<div class=\"company\">{}", escape(&exp.company));
            if !exp.location.is_empty() {
                let _ = write!(html, " - {}", escape(&exp.location));
            }
            html.push_str("</div>");
            let _ = write!(html, "<div class=\"date\">{}</div>", escape(&exp.date_range()));
            let _ = write!(html, "<p>{}</p>", escape_block(&exp.description));
            html.push_str("</div>");
        }
        close_section(&mut html);
    }

    if !doc.education.is_empty() {
        open_section(&mut html, "Education");
        for edu in &doc.education {
            html.push_str("<div class=\"education-item\">");
            let _ = write!(
                html,
                "<div class=\"job-title\">{} in {}</div>",
                escape(&edu.degree),
                escape(&edu.field)
            );
            let _ = write!(html, "<div class=\"company\">{}", escape(&edu.school));
            if !edu.location.is_empty() {
                let _ = write!(html, " - {}", escape(&edu.location));
            }
            html.push_str("</div>");
            let _ = write!(html, "<div class=\"date\">{}</div>", escape(&edu.date_range()));
            if let Some(gpa) = edu.gpa() {
                let _ = write!(html, "<p>GPA: {}</p>", escape(gpa));
            }
            html.push_str("</div>");
        }
        close_section(&mut html);
    }

    if !doc.skills.is_empty() {
        open_section(&mut html, "Skills");
        if !doc.skills.technical.is_empty() {
            let _ = write!(
                html,
                "<p><strong>Technical:</strong> {}</p>",
                escape(&doc.skills.technical.join(", "))
            );
        }
        if !doc.skills.soft.is_empty() {
            let _ = write!(
                html,
                "<p><strong>Soft Skills:</strong> {}</p>",
                escape(&doc.skills.soft.join(", "))
            );
        }
        close_section(&mut html);
    }

    if !doc.projects.is_empty() {
        open_section(&mut html, "Projects");
        for project in &doc.projects {
            html.push_str("<div class=\"project-item\">");
            let _ = write!(html, "<div class=\"job-title\">{}</div>", escape(&project.name));
            let _ = write!(html, "<p>{}</p>", escape_block(&project.description));
            if !project.technologies.is_empty() {
                let _ = write!(
                    html,
                    "<p><strong>Technologies:</strong> {}</p>",
                    escape(&project.technologies.join(", "))
                );
            }
            if let Some(link) = project.link() {
                let _ = write!(html, "<p><strong>Link:</strong> {}</p>", escape(link));
            }
            html.push_str("</div>");
        }
        close_section(&mut html);
    }

    if !doc.certifications.is_empty() {
        open_section(&mut html, "Certifications");
        html.push_str("<ul>");
        for cert in &doc.certifications {
            let _ = write!(
                html,
                "<li>{} - {} ({})</li>",
                escape(&cert.name),
                escape(&cert.issuer),
                escape(&cert.date)
            );
        }
        html.push_str("</ul>");
        close_section(&mut html);
    }

    if !doc.languages.is_empty() {
        open_section(&mut html, "Languages");
        html.push_str("<ul>");
        for lang in &doc.languages {
            let _ = write!(
                html,
                "<li>{}: {}</li>",
                escape(&lang.language),
                escape(&lang.proficiency)
            );
        }
        html.push_str("</ul>");
        close_section(&mut html);
    }

    html.push_str("\n</body>\n</html>\n");
    html
}

fn open_section(html: &mut String, title: &str) {
    let _ = write!(html, "<div class=\"section\"><h2>{title}</h2>");
}

fn close_section(html: &mut String) {
    html.push_str("</div>");
}

/// Escapes reserved markup characters (`<`, `>`, `&`, quotes) after dropping control characters.
fn escape(value: &str) -> Cow<'_, str> {
    match strip_control_chars(value) {
        Cow::Borrowed(s) => html_escape::encode_safe(s),
        Cow::Owned(s) => Cow::Owned(html_escape::encode_safe(&s).into_owned()),
    }
}

/// Like `escape`, but keeps the user's line breaks visible.
fn escape_block(value: &str) -> String {
    escape(value).replace('\n', "<br>")
}
