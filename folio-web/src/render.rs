//! HTML rendering from embedded templates
//!
//! Templates are plain HTML with `{{name}}` placeholders. Values passed to
//! [`fill`] are inserted verbatim, so callers escape text with [`escape`]
//! and only pass pre-built markup they produced themselves.

use folio_common::{BioDocument, Lang, TrackRecord};

use crate::content::{SiteContent, TrackView};

const INDEX_HTML: &str = include_str!("../templates/index.html");
const ADMIN_LAYOUT_HTML: &str = include_str!("../templates/admin_layout.html");
const ADMIN_ABOUT_HTML: &str = include_str!("../templates/admin_about.html");
const ADMIN_WORK_HTML: &str = include_str!("../templates/admin_work.html");
const ADMIN_TRANSLATIONS_HTML: &str = include_str!("../templates/admin_translations.html");

/// Escape text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Substitute `{{name}}` placeholders
///
/// Single pass: text inserted for one placeholder is never scanned again.
/// Unknown placeholders are left as they are.
pub fn fill(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// JSON that is safe to embed in a `<script type="application/json">` block
fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Paragraphs separated by blank lines become `<p>` elements
fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape(p).replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n")
}

// ========================================
// Public Pages
// ========================================

const SERVICE_KEYS: [&str; 5] = ["mixing", "mastering", "production", "recording", "editing"];

/// Keys rendered on the landing page, in template placeholder form
const LANDING_KEYS: [&str; 18] = [
    "meta.title",
    "meta.description",
    "nav.about",
    "nav.work",
    "nav.contact",
    "hero.title",
    "hero.subtitle",
    "about.heading",
    "work.heading",
    "work.empty",
    "contact.heading",
    "contact.email",
    "contact.bandName",
    "contact.numberOfSongs",
    "contact.links",
    "contact.services",
    "contact.message",
    "contact.submit",
];

/// Landing page for `lang`
pub fn landing_page(content: &SiteContent, tracks: &[TrackView], lang: Lang) -> String {
    let t = |key: &str| escape(&content.t(lang, key));

    let track_items = if tracks.is_empty() {
        format!("<p class=\"empty\">{}</p>", t("work.empty"))
    } else {
        tracks
            .iter()
            .enumerate()
            .map(|(index, track)| {
                format!(
                    "<li class=\"track\" data-index=\"{}\" data-src=\"{}\"><span class=\"track-title\">{}</span><div class=\"waveform\"></div></li>",
                    index,
                    escape(&track.url),
                    escape(&track.title)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let service_options = SERVICE_KEYS
        .iter()
        .map(|service| {
            format!(
                "<label><input type=\"checkbox\" name=\"services\" value=\"{}\"> {}</label>",
                service,
                t(format!("services.{}", service).as_str())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut vars: Vec<(&str, String)> = LANDING_KEYS.iter().map(|key| (*key, t(*key))).collect();
    vars.extend([
        ("lang", lang.code().to_string()),
        ("other_lang", lang.other().code().to_string()),
        ("other_lang_label", lang.other().code().to_uppercase()),
        ("bio", paragraphs(content.bio.get(lang))),
        ("tracks", track_items),
        ("tracks_json", script_json(&tracks)),
        ("services", service_options),
    ]);
    fill(INDEX_HTML, &vars)
}

// ========================================
// Admin Pages
// ========================================

/// Flash message carried through the `?message=` / `?error=` redirect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    pub message: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    /// Add an error, keeping any error already carried by the redirect
    pub fn push_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        self.error = Some(match self.error.take() {
            Some(existing) => format!("{} {}", existing, error),
            None => error,
        });
    }

    fn to_html(&self) -> String {
        let mut html = String::new();
        if let Some(message) = &self.message {
            html.push_str(&format!(
                "<div class=\"notice success\">{}</div>",
                escape(message)
            ));
        }
        if let Some(error) = &self.error {
            html.push_str(&format!(
                "<div class=\"notice error\">{}</div>",
                escape(error)
            ));
        }
        html
    }
}

fn admin_page(title: &str, flash: &Flash, body: String) -> String {
    fill(
        ADMIN_LAYOUT_HTML,
        &[
            ("title", escape(title)),
            ("flash", flash.to_html()),
            ("body", body),
        ],
    )
}

pub fn admin_about(bio: &BioDocument, has_photo: bool, flash: &Flash) -> String {
    let photo = if has_photo {
        "<img class=\"profile\" src=\"/images/profile.webp\" alt=\"Profile photo\">".to_string()
    } else {
        "<p class=\"empty\">No profile photo uploaded yet.</p>".to_string()
    };
    let body = fill(
        ADMIN_ABOUT_HTML,
        &[
            ("bio_en", escape(&bio.en)),
            ("bio_fr", escape(&bio.fr)),
            ("photo", photo),
        ],
    );
    admin_page("About", flash, body)
}

pub fn admin_work(tracks: &[TrackRecord], flash: &Flash) -> String {
    let rows = if tracks.is_empty() {
        "<tr><td colspan=\"3\" class=\"empty\">No tracks uploaded yet.</td></tr>".to_string()
    } else {
        tracks
            .iter()
            .map(|track| {
                let filename = escape(&track.filename);
                format!(
                    r#"<tr>
  <td><audio controls preload="none" src="{url}"></audio><br><code>{filename}</code></td>
  <td>
    <form method="post" action="/admin/work/update">
      <input type="hidden" name="filename" value="{filename}">
      <input type="text" name="title" value="{title}" maxlength="200" required>
      <button type="submit">Save</button>
    </form>
  </td>
  <td class="actions">
    <form method="post" action="/admin/work/reorder"><input type="hidden" name="filename" value="{filename}"><input type="hidden" name="direction" value="up"><button type="submit">↑</button></form>
    <form method="post" action="/admin/work/reorder"><input type="hidden" name="filename" value="{filename}"><input type="hidden" name="direction" value="down"><button type="submit">↓</button></form>
    <form method="post" action="/admin/work/delete" onsubmit="return confirm('Delete this track?')"><input type="hidden" name="filename" value="{filename}"><button type="submit" class="danger">Delete</button></form>
  </td>
</tr>"#,
                    url = escape(&track.url()),
                    filename = filename,
                    title = escape(&track.title),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let body = fill(ADMIN_WORK_HTML, &[("rows", rows)]);
    admin_page("Work", flash, body)
}

/// Editor page; each text is either a pretty-printed dictionary or the
/// file exactly as stored when it does not parse
pub fn admin_translations(en_text: &str, fr_text: &str, flash: &Flash) -> String {
    let body = fill(
        ADMIN_TRANSLATIONS_HTML,
        &[("locale_en", escape(en_text)), ("locale_fr", escape(fr_text))],
    );
    admin_page("Translations", flash, body)
}
