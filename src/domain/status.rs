// src/domain/status.rs

/// RGB color, 0..=255 per channel.
pub type Rgb = (u8, u8, u8);

/// A raw status string rendered as a colored chip. Derived purely from
/// the normalized form of the input, so "Regular", "REGULAR " and
/// "regular" all land in the same bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChip {
    pub label: String,
    pub foreground: Rgb,
    pub background: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipBucket {
    Green,
    Red,
    Yellow,
    Gray,
}

impl ChipBucket {
    pub fn colors(self) -> (Rgb, Rgb) {
        match self {
            // (foreground, background)
            ChipBucket::Green => ((22, 101, 52), (220, 252, 231)),
            ChipBucket::Red => ((153, 27, 27), (254, 226, 226)),
            ChipBucket::Yellow => ((133, 77, 14), (254, 249, 195)),
            ChipBucket::Gray => ((55, 65, 81), (229, 231, 235)),
        }
    }
}

/// Lowercase, strip diacritics, collapse whitespace runs to single
/// hyphens. "Não Informado" -> "nao-informado".
pub fn normalize_status(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_gap = false;

    for c in raw.trim().chars() {
        if c.is_whitespace() {
            pending_gap = !out.is_empty();
            continue;
        }
        if pending_gap {
            out.push('-');
            pending_gap = false;
        }
        for lower in c.to_lowercase() {
            out.push(fold_diacritic(lower));
        }
    }

    out
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Bucket a raw status string. Unknown and empty values are gray, never
/// an error.
pub fn bucket_for(raw: &str) -> ChipBucket {
    match normalize_status(raw).as_str() {
        "regular" => ChipBucket::Green,
        "irregular" | "inativa" | "suspensa" => ChipBucket::Red,
        "nao-informado" | "nao" => ChipBucket::Yellow,
        _ => ChipBucket::Gray,
    }
}

/// Chip for an optional raw status; `None`/blank render as an "N/A" gray
/// chip.
pub fn status_chip(raw: Option<&str>) -> StatusChip {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let (label, bucket) = match raw {
        Some(s) => (s.to_string(), bucket_for(s)),
        None => ("N/A".to_string(), ChipBucket::Gray),
    };
    let (foreground, background) = bucket.colors();
    StatusChip {
        label,
        foreground,
        background,
    }
}
