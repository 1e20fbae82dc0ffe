//! Plain-text rendering of a resume.
//!
//! Section order is fixed: header, Professional Summary, Work Experience, Education, Skills,
//! Projects, Certifications, Languages. A section with nothing to show is left out entirely.

use std::fmt::Write;

use crate::export::strip_control_chars;
use crate::models::resume::ResumeDocument;

const RULE_WIDTH: usize = 50;

/// Serializes a document into linear plain text. Pure and total.
pub fn serialize(doc: &ResumeDocument) -> String {
    let mut out = String::new();
    write_header(&mut out, doc);
    write_summary(&mut out, doc);
    write_experience(&mut out, doc);
    write_education(&mut out, doc);
    write_skills(&mut out, doc);
    write_projects(&mut out, doc);
    write_certifications(&mut out, doc);
    write_languages(&mut out, doc);
    out
}

fn write_header(out: &mut String, doc: &ResumeDocument) {
    let info = &doc.personal_info;
    line(out, &info.full_name);
    line(out, &format!("{} | {}", info.email, info.phone));
    line(out, &info.location);
    if !info.linkedin.is_empty() {
        line(out, &format!("LinkedIn: {}", info.linkedin));
    }
    if !info.website.is_empty() {
        line(out, &format!("Website: {}", info.website));
    }
    out.push('\n');
}

fn write_summary(out: &mut String, doc: &ResumeDocument) {
    let summary = &doc.personal_info.summary;
    if summary.is_empty() {
        return;
    }
    section_header(out, "PROFESSIONAL SUMMARY");
    line(out, summary);
    out.push('\n');
}

fn write_experience(out: &mut String, doc: &ResumeDocument) {
    if doc.experience.is_empty() {
        return;
    }
    section_header(out, "WORK EXPERIENCE");
    for exp in &doc.experience {
        out.push('\n');
        line(out, &format!("{} at {}", exp.position, exp.company));
        let mut dates = exp.date_range();
        if !exp.location.is_empty() {
            let _ = write!(dates, " | {}", exp.location);
        }
        line(out, &dates);
        line(out, &exp.description);
    }
    out.push('\n');
}

fn write_education(out: &mut String, doc: &ResumeDocument) {
    if doc.education.is_empty() {
        return;
    }
    section_header(out, "EDUCATION");
    for edu in &doc.education {
        out.push('\n');
        line(out, &format!("{} in {}", edu.degree, edu.field));
        let mut school = edu.school.clone();
        if !edu.location.is_empty() {
            let _ = write!(school, " | {}", edu.location);
        }
        line(out, &school);
        let mut dates = edu.date_range();
        if let Some(gpa) = edu.gpa() {
            let _ = write!(dates, " | GPA: {gpa}");
        }
        line(out, &dates);
    }
    out.push('\n');
}

fn write_skills(out: &mut String, doc: &ResumeDocument) {
    let skills = &doc.skills;
    if skills.is_empty() {
        return;
    }
    section_header(out, "SKILLS");
    if !skills.technical.is_empty() {
        line(out, &format!("Technical: {}", skills.technical.join(", ")));
    }
    if !skills.soft.is_empty() {
        line(out, &format!("Soft Skills: {}", skills.soft.join(", ")));
    }
    out.push('\n');
}

fn write_projects(out: &mut String, doc: &ResumeDocument) {
    if doc.projects.is_empty() {
        return;
    }
    section_header(out, "PROJECTS");
    for project in &doc.projects {
        out.push('\n');
        line(out, &project.name);
        line(out, &project.description);
        if !project.technologies.is_empty() {
            line(
                out,
                &format!("Technologies: {}", project.technologies.join(", ")),
            );
        }
        if let Some(link) = project.link() {
            line(out, &format!("Link: {link}"));
        }
    }
    out.push('\n');
}

fn write_certifications(out: &mut String, doc: &ResumeDocument) {
    if doc.certifications.is_empty() {
        return;
    }
    section_header(out, "CERTIFICATIONS");
    for cert in &doc.certifications {
        line(
            out,
            &format!("{} - {} ({})", cert.name, cert.issuer, cert.date),
        );
    }
    out.push('\n');
}

fn write_languages(out: &mut String, doc: &ResumeDocument) {
    if doc.languages.is_empty() {
        return;
    }
    section_header(out, "LANGUAGES");
    for lang in &doc.languages {
        line(out, &format!("{}: {}", lang.language, lang.proficiency));
    }
}

fn section_header(out: &mut String, title: &str) {
    line(out, title);
    line(out, &"-".repeat(RULE_WIDTH));
}

/// Appends `value` with control characters removed, then a newline.
fn line(out: &mut String, value: &str) {
    out.push_str(&strip_control_chars(value));
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{
        Certification, Education, Experience, LanguageEntry, PersonalInfo, Project, Skills,
    };

    fn jane() -> ResumeDocument {
        ResumeDocument {
            personal_info: PersonalInfo {
                full_name: "Jane Smith".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn experience(id: &str, company: &str, current: bool) -> Experience {
        Experience {
            id: id.to_string(),
            company: company.to_string(),
            position: "Engineer".to_string(),
            location: String::new(),
            start_date: "2020-01".to_string(),
            end_date: "2021-06".to_string(),
            current,
            description: format!("Worked at {company}"),
        }
    }

    #[test]
    fn test_header_only_document_is_pinned() {
        assert_eq!(serialize(&jane()), "Jane Smith\n | \n\n\n");
    }

    #[test]
    fn test_full_header_includes_optional_links() {
        let mut doc = jane();
        doc.personal_info.email = "jane@example.com".to_string();
        doc.personal_info.phone = "555-0100".to_string();
        doc.personal_info.location = "Austin, TX".to_string();
        doc.personal_info.linkedin = "linkedin.com/in/jane".to_string();
        doc.personal_info.website = "jane.dev".to_string();

        assert_eq!(
            serialize(&doc),
            "Jane Smith\njane@example.com | 555-0100\nAustin, TX\n\
             LinkedIn: linkedin.com/in/jane\nWebsite: jane.dev\n\n"
        );
    }

    #[test]
    fn test_empty_experience_has_no_header() {
        let out = serialize(&jane());
        assert!(!out.contains("WORK EXPERIENCE"));
    }

    #[test]
    fn test_experience_section_layout() {
        let mut doc = jane();
        let mut exp = experience("1", "Tech Corp", false);
        exp.location = "Remote".to_string();
        doc.experience.push(exp);

        let expected = format!(
            "Jane Smith\n | \n\n\nWORK EXPERIENCE\n{}\n\nEngineer at Tech Corp\n\
             2020-01 - 2021-06 | Remote\nWorked at Tech Corp\n\n",
            "-".repeat(50)
        );
        assert_eq!(serialize(&doc), expected);
    }

    #[test]
    fn test_current_role_shows_present_and_hides_end_date() {
        let mut doc = jane();
        let mut exp = experience("1", "Tech Corp", true);
        exp.end_date = "2099-12".to_string();
        doc.experience.push(exp);

        let out = serialize(&doc);
        assert!(out.contains("2020-01 - Present"));
        assert!(!out.contains("2099-12"));
    }

    #[test]
    fn test_entries_keep_input_order() {
        let mut doc = jane();
        doc.experience = vec![
            Experience {
                company: "Zeta Labs".into(),
                ..Default::default()
            },
            Experience {
                company: "Alpha Works".into(),
                ..Default::default()
            },
        ];
        doc.education = vec![
            Education {
                school: "Northfield College".into(),
                ..Default::default()
            },
            Education {
                school: "Bayside University".into(),
                ..Default::default()
            },
        ];
        doc.projects = vec![
            Project {
                name: "Zebra Tracker".into(),
                ..Default::default()
            },
            Project {
                name: "Aardvark CLI".into(),
                ..Default::default()
            },
        ];
        doc.certifications = vec![
            Certification {
                name: "Kubernetes Administrator".into(),
                ..Default::default()
            },
            Certification {
                name: "Cloud Practitioner".into(),
                ..Default::default()
            },
        ];
        doc.languages = vec![
            LanguageEntry {
                language: "Spanish".into(),
                proficiency: "Professional".into(),
                ..Default::default()
            },
            LanguageEntry {
                language: "English".into(),
                proficiency: "Native".into(),
                ..Default::default()
            },
        ];

        let out = serialize(&doc);
        for (first, second) in [
            ("Zeta Labs", "Alpha Works"),
            ("Northfield College", "Bayside University"),
            ("Zebra Tracker", "Aardvark CLI"),
            ("Kubernetes Administrator", "Cloud Practitioner"),
            ("Spanish", "English"),
        ] {
            let (i, j) = (out.find(first).unwrap(), out.find(second).unwrap());
            assert!(i < j, "{first} should come before {second}");
        }
    }

    #[test]
    fn test_section_order_is_fixed() {
        let mut doc = jane();
        doc.personal_info.summary = "Builder of things".to_string();
        doc.experience.push(experience("1", "Tech Corp", false));
        doc.education.push(Education {
            school: "State U".into(),
            degree: "BSc".into(),
            field: "CS".into(),
            gpa: Some("3.8".into()),
            ..Default::default()
        });
        doc.skills = Skills {
            technical: vec!["Rust".into()],
            soft: vec![],
        };
        doc.projects.push(Project {
            name: "Widget".into(),
            technologies: vec!["Rust".into(), "Axum".into()],
            link: Some("github.com/w".into()),
            ..Default::default()
        });
        doc.certifications.push(Certification {
            name: "CKA".into(),
            issuer: "CNCF".into(),
            date: "2023".into(),
            ..Default::default()
        });
        doc.languages.push(LanguageEntry {
            language: "English".into(),
            proficiency: "Native".into(),
            ..Default::default()
        });

        let out = serialize(&doc);
        let headers = [
            "PROFESSIONAL SUMMARY",
            "WORK EXPERIENCE",
            "EDUCATION",
            "SKILLS",
            "PROJECTS",
            "CERTIFICATIONS",
            "LANGUAGES",
        ];
        let positions: Vec<usize> = headers.iter().map(|h| out.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(out.contains(" | GPA: 3.8\n"));
        assert!(out.contains("Technical: Rust\n"));
        assert!(!out.contains("Soft Skills"));
        assert!(out.contains("Technologies: Rust, Axum\n"));
        assert!(out.contains("Link: github.com/w\n"));
        assert!(out.contains("CKA - CNCF (2023)\n"));
        assert!(out.ends_with("English: Native\n"));
    }

    #[test]
    fn test_control_characters_are_dropped() {
        let mut doc = jane();
        doc.personal_info.summary = "Line one\r\nLine\u{7} two".to_string();
        let out = serialize(&doc);
        assert!(out.contains("Line one\nLine two\n"));
        assert!(!out.contains('\r'));
        assert!(!out.contains('\u{7}'));
    }
}
