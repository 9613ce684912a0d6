//! Links that hand a finished report to the user's mail, chat or phone app.

use civicflow_core::Report;
use urlencoding::encode;

use crate::history::clean_text;

const ANIMAL_RESCUE_LINE: &str = "+919602302323";
const CIVIC_HELPLINE: &str = "18001806666";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallLink {
    pub label: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchLinks {
    pub mailto: String,
    pub gmail: String,
    pub outlook: String,
    pub whatsapp: String,
    pub call: CallLink,
}

impl DispatchLinks {
    pub fn for_report(report: &Report, address: &str) -> Self {
        let to = report.recipient_email.as_str();
        let subject = encode(&clean_text(&report.email_draft.subject)).into_owned();
        let body = encode(&email_body(report, address)).into_owned();

        Self {
            mailto: format!("mailto:{to}?subject={subject}&body={body}"),
            gmail: format!(
                "https://mail.google.com/mail/?view=cm&fs=1&to={to}&su={subject}&body={body}"
            ),
            outlook: format!(
                "https://outlook.live.com/owa/?path=/mail/action/compose&to={to}&subject={subject}&body={body}"
            ),
            whatsapp: whatsapp_link(report, address),
            call: call_link(report),
        }
    }
}

/// Letter body with the location line appended.
fn email_body(report: &Report, address: &str) -> String {
    format!("{}\n\nLocation: {address}", clean_text(&report.email_draft.body))
}

fn whatsapp_link(report: &Report, address: &str) -> String {
    let text = format!(
        "*Civic Report*\n{}\n\n{}\n\nLoc: {address}",
        clean_text(&report.category),
        clean_text(&report.description)
    );
    format!("https://wa.me/?text={}", encode(&text))
}

/// Recipient phone when the report has one, else the matching helpline.
pub fn call_link(report: &Report) -> CallLink {
    let (label, helpline) = if report.recipient_name.contains("Animal") {
        ("📞 Call Animal Rescue", ANIMAL_RESCUE_LINE)
    } else if report.category.contains("Jalkumbhi") || report.recipient_name.contains("Lake") {
        ("🌊 Call Lake Patrol", CIVIC_HELPLINE)
    } else {
        ("☎️ Call Nagar Nigam", CIVIC_HELPLINE)
    };

    let number: String = report
        .recipient_phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    let number = if number.is_empty() {
        helpline.to_string()
    } else {
        number
    };

    CallLink {
        label,
        href: format!("tel:{number}"),
    }
}

#[cfg(test)]
mod tests {
    use civicflow_core::{EmailDraft, Priority};

    use super::*;

    fn report(category: &str, name: &str, phone: &str) -> Report {
        Report {
            category: category.to_string(),
            priority: Priority::High,
            recipient_name: name.to_string(),
            recipient_email: "commudr@gmail.com".to_string(),
            recipient_phone: phone.to_string(),
            description: "**Garbage** overflowing".to_string(),
            eco_tip: String::new(),
            email_draft: EmailDraft {
                subject: "## Garbage & waste".to_string(),
                body: "Respected Sir/Madam,\n\nPlease act.".to_string(),
            },
            image_url: String::new(),
        }
    }

    #[test]
    fn test_mailto_is_encoded_and_cleaned() {
        let links = DispatchLinks::for_report(
            &report("Garbage Dump", "Municipal Corporation Udaipur", "02942426262"),
            "Surajpole, Udaipur",
        );
        assert!(links
            .mailto
            .starts_with("mailto:commudr@gmail.com?subject=%20Garbage%20%26%20waste&body="));
        assert!(links.mailto.contains("Location%3A%20Surajpole%2C%20Udaipur"));
        assert!(!links.mailto.contains('#'));
        assert!(links.gmail.contains("&su=%20Garbage%20%26%20waste"));
        assert!(links.outlook.contains("&to=commudr@gmail.com"));
    }

    #[test]
    fn test_whatsapp_text() {
        let links = DispatchLinks::for_report(
            &report("Garbage Dump", "Municipal Corporation Udaipur", ""),
            "MG Road",
        );
        let expected = encode("*Civic Report*\nGarbage Dump\n\nGarbage overflowing\n\nLoc: MG Road");
        assert_eq!(links.whatsapp, format!("https://wa.me/?text={expected}"));
    }

    #[test]
    fn test_call_link_prefers_recipient_phone() {
        let call = call_link(&report("Dead Cow", "Animal Aid Unlimited", "098298 43726"));
        assert_eq!(call.label, "📞 Call Animal Rescue");
        assert_eq!(call.href, "tel:09829843726");
    }

    #[test]
    fn test_call_link_falls_back_to_helplines() {
        let animal = call_link(&report("Injured Dog", "Animal Aid Unlimited", ""));
        assert_eq!(animal.href, "tel:+919602302323");

        let lake = call_link(&report("Jalkumbhi (Water Hyacinth)", "Someone", ""));
        assert_eq!(lake.label, "🌊 Call Lake Patrol");
        assert_eq!(lake.href, "tel:18001806666");

        let vehicle = call_link(&report("Garbage Vehicle Missed", "Nagar Nigam (Vehicle Dept)", ""));
        assert_eq!(vehicle.label, "☎️ Call Nagar Nigam");
        assert_eq!(vehicle.href, "tel:18001806666");
    }
}
