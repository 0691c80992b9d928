//! Declarative cell styling.
//!
//! Builders tag cells with a [`CellRole`]; [`style_for`] maps a role to a
//! [`CellStyle`] descriptor that the rendering backend applies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellRole {
    /// Sheet title at the top of a sheet or table.
    Title,
    /// Column header of a table.
    Header,
    /// Heading of a key/value block.
    SectionHeader,
    /// Left-hand label of a key/value row.
    Label,
    /// Plain data.
    Value,
    /// Informational text such as the no-data marker.
    Note,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlign {
    General,
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub font_size: f64,
    /// 0xRRGGBB
    pub font_color: Option<u32>,
    /// 0xRRGGBB
    pub fill: Option<u32>,
    pub border: bool,
    pub align: HorizontalAlign,
}

impl Default for CellStyle {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            font_size: 11.0,
            font_color: None,
            fill: None,
            border: false,
            align: HorizontalAlign::General,
        }
    }
}

const BRAND_BLUE: u32 = 0x1F4E78;
const HEADER_FILL: u32 = 0xD9E1F2;
const SECTION_FILL: u32 = 0xE2EFDA;
const MUTED_GRAY: u32 = 0x808080;

pub fn style_for(role: CellRole) -> CellStyle {
    let base = CellStyle::default();
    match role {
        CellRole::Title => CellStyle {
            bold: true,
            font_size: 14.0,
            font_color: Some(BRAND_BLUE),
            ..base
        },
        CellRole::Header => CellStyle {
            bold: true,
            fill: Some(HEADER_FILL),
            border: true,
            align: HorizontalAlign::Center,
            ..base
        },
        CellRole::SectionHeader => CellStyle {
            bold: true,
            font_size: 12.0,
            fill: Some(SECTION_FILL),
            ..base
        },
        CellRole::Label => CellStyle {
            bold: true,
            align: HorizontalAlign::Left,
            ..base
        },
        CellRole::Value => CellStyle {
            border: true,
            ..base
        },
        CellRole::Note => CellStyle {
            italic: true,
            font_color: Some(MUTED_GRAY),
            ..base
        },
    }
}
