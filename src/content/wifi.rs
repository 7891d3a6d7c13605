use serde::Serialize;

const PREFIX: &str = "WIFI:";

/// Fields of a `WIFI:T:<auth>;S:<ssid>;P:<password>;H:<hidden>;;` payload.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WifiCredential {
    pub ssid: String,
    pub authentication: Option<String>,
    pub password: Option<String>,
    pub hidden: bool,
}

impl WifiCredential {
    /// Parse a network-credential payload. Returns `None` when the prefix is
    /// missing or no SSID is present. `\;`, `\:`, `\,` and `\\` unescape.
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix(PREFIX)?;
        let mut credential = WifiCredential::default();
        let mut ssid = None;

        for field in split_unescaped(body) {
            let Some((key, value)) = field.split_once(':') else {
                continue;
            };
            let value = unescape(value);
            match key {
                "S" => ssid = Some(value),
                "T" if !value.is_empty() => credential.authentication = Some(value),
                "P" if !value.is_empty() => credential.password = Some(value),
                "H" => credential.hidden = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        credential.ssid = ssid.filter(|ssid| !ssid.is_empty())?;
        Some(credential)
    }
}

/// Split on `;` that is not preceded by a backslash escape.
fn split_unescaped(body: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (idx, ch) in body.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            ';' if !escaped => {
                fields.push(&body[start..idx]);
                start = idx + 1;
            }
            _ => escaped = false,
        }
    }
    if start < body.len() {
        fields.push(&body[start..]);
    }
    fields
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}
