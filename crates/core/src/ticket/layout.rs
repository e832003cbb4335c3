//! Fixed ticket layout.
//!
//! Produces a display list in millimetres with a top-left origin and
//! baseline-anchored text. The PDF writer maps it to page space.

use serde::Serialize;

use super::fonts::Font;
use super::{DocumentError, TicketConfig, TicketRecord};

pub const PAGE_WIDTH_MM: f32 = 120.0;
pub const PAGE_HEIGHT_MM: f32 = 215.0;

const HEADER_HEIGHT: f32 = 100.0;
const NOTCH_RADIUS: f32 = 6.0;
const QR_SIZE: f32 = 55.0;
const QR_TOP: f32 = 10.0;
const SIDE_MARGIN: f32 = 8.0;
const BOX_HEIGHT: f32 = 35.0;
const BOX_RADIUS: f32 = 3.0;
const BULLET_WRAP_INSET: f32 = 25.0;
const BULLET_ADVANCE: f32 = 5.0;
const DETAIL_LEFT: f32 = 10.0;
const DETAIL_LABEL_WIDTH: f32 = 30.0;
const DETAIL_SPACING: f32 = 6.0;
const FOOTER_INSET: f32 = 4.0;

pub const HEADER_COLOR: Rgb = Rgb(108, 0, 255);
pub const ACCENT_COLOR: Rgb = Rgb(155, 80, 255);
pub const WHITE: Rgb = Rgb(255, 255, 255);
pub const BLACK: Rgb = Rgb(0, 0, 0);
const BOX_STROKE: Rgb = Rgb(200, 200, 200);
const FOOTER_COLOR: Rgb = Rgb(120, 120, 120);

pub const SCAN_CAPTION: &str = "SCAN HERE!";
pub const ENTRY_HEADING: &str = "ENTRY AND SCANNING DETAILS";
pub const HOLDER_HEADING: &str = "TICKET HOLDER DETAILS";
const BLANK_VALUE: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
}

/// One drawing instruction. Coordinates in mm from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    FillTriangle {
        points: [(f32, f32); 3],
        color: Rgb,
    },
    FillCircle {
        cx: f32,
        cy: f32,
        r: f32,
        color: Rgb,
    },
    StrokeRoundedRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        r: f32,
        line_width: f32,
        color: Rgb,
    },
    /// The rasterized QR code.
    QrImage { x: f32, y: f32, size: f32 },
    Text {
        text: String,
        x: f32,
        y: f32,
        font: Font,
        size: f32,
        color: Rgb,
        align: Align,
    },
}

/// The laid-out page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TicketLayout {
    pub width: f32,
    pub height: f32,
    pub ops: Vec<DrawOp>,
    /// Holder details in printed order.
    pub details: Vec<(String, String)>,
}

/// Label/value pairs of the holder section, in printed order.
///
/// Identity lines are always present (blank values print as "-"); a guest
/// line exists only when that guest has a name.
pub fn holder_details(ticket: &TicketRecord) -> Vec<(String, String)> {
    fn or_blank(value: Option<&str>) -> String {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => BLANK_VALUE.to_string(),
        }
    }

    let mut details = vec![
        ("Student".to_string(), or_blank(Some(&ticket.name))),
        ("Roll No".to_string(), or_blank(Some(&ticket.roll_no))),
        ("Programme".to_string(), or_blank(ticket.programme.as_deref())),
        (
            "Year of Passing".to_string(),
            or_blank(ticket.year_of_passing.as_deref()),
        ),
        ("Email".to_string(), or_blank(Some(&ticket.email))),
    ];

    let guests = [("Guest 1", &ticket.guest_1_name), ("Guest 2", &ticket.guest_2_name)];
    for (label, guest) in guests {
        if let Some(name) = guest.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            details.push((label.to_string(), name.to_string()));
        }
    }

    details
}

#[derive(Clone, Copy)]
struct Style {
    font: Font,
    size: f32,
    color: Rgb,
    align: Align,
}

const fn style(font: Font, size: f32, color: Rgb, align: Align) -> Style {
    Style {
        font,
        size,
        color,
        align,
    }
}

const CAPTION: Style = style(Font::HelveticaBold, 9.0, WHITE, Align::Center);
const TITLE: Style = style(Font::HelveticaBold, 14.0, WHITE, Align::Center);
const SUBTITLE: Style = style(Font::HelveticaBold, 10.0, WHITE, Align::Center);
const INSTRUCTION: Style = style(Font::Helvetica, 8.0, WHITE, Align::Center);
const HEADING: Style = style(Font::HelveticaBold, 11.0, BLACK, Align::Center);
const BULLET: Style = style(Font::Helvetica, 9.0, BLACK, Align::Left);
const LABEL: Style = style(Font::HelveticaBold, 10.0, BLACK, Align::Left);
const VALUE: Style = style(Font::Helvetica, 10.0, BLACK, Align::Left);
const FOOTER: Style = style(Font::Helvetica, 8.0, FOOTER_COLOR, Align::Center);

struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    fn text(&mut self, text: impl Into<String>, x: f32, y: f32, style: Style) {
        self.ops.push(DrawOp::Text {
            text: text.into(),
            x,
            y,
            font: style.font,
            size: style.size,
            color: style.color,
            align: style.align,
        });
    }

    /// Lines stacked at the font's line height starting from baseline `y`.
    fn lines(&mut self, lines: &[String], x: f32, y: f32, style: Style) {
        let step = Font::line_height_mm(style.size);
        for (i, line) in lines.iter().enumerate() {
            self.text(line.clone(), x, y + step * i as f32, style);
        }
    }
}

/// Lay out the ticket.
///
/// Fails when a mandatory field is blank; nothing is drawn in that case.
pub fn layout_ticket(
    ticket: &TicketRecord,
    config: &TicketConfig,
) -> Result<TicketLayout, DocumentError> {
    for (field, value) in [
        ("qrSvgString", &ticket.qr_svg),
        ("name", &ticket.name),
        ("email", &ticket.email),
        ("roll_no", &ticket.roll_no),
    ] {
        if value.trim().is_empty() {
            return Err(DocumentError::MissingField(field));
        }
    }

    let w = PAGE_WIDTH_MM;
    let h = PAGE_HEIGHT_MM;
    let center = w / 2.0;
    let mut page = Page { ops: Vec::new() };

    // Header band
    page.ops.push(DrawOp::FillRect {
        x: 0.0,
        y: 0.0,
        w,
        h: HEADER_HEIGHT,
        color: HEADER_COLOR,
    });
    page.ops.push(DrawOp::FillTriangle {
        points: [
            (0.0, HEADER_HEIGHT - 20.0),
            (w, HEADER_HEIGHT - 45.0),
            (w, HEADER_HEIGHT),
        ],
        color: ACCENT_COLOR,
    });
    for cy in [0.0, h] {
        page.ops.push(DrawOp::FillCircle {
            cx: center,
            cy,
            r: NOTCH_RADIUS,
            color: WHITE,
        });
    }

    page.ops.push(DrawOp::QrImage {
        x: (w - QR_SIZE) / 2.0,
        y: QR_TOP,
        size: QR_SIZE,
    });

    let below_qr = QR_TOP + QR_SIZE;
    page.text(SCAN_CAPTION, center, below_qr + 5.0, CAPTION);
    page.text(config.event_title.clone(), center, below_qr + 15.0, TITLE);
    page.text(config.organisation.clone(), center, below_qr + 21.0, SUBTITLE);
    let instruction = INSTRUCTION
        .font
        .wrap(&config.instruction, INSTRUCTION.size, w - 2.0 * SIDE_MARGIN);
    page.lines(&instruction, center, below_qr + 30.0, INSTRUCTION);

    // Lower section
    page.ops.push(DrawOp::FillRect {
        x: 0.0,
        y: HEADER_HEIGHT,
        w,
        h: h - HEADER_HEIGHT,
        color: WHITE,
    });

    let mut y = HEADER_HEIGHT + 8.0;
    page.text(ENTRY_HEADING, center, y, HEADING);

    y += 4.0;
    page.ops.push(DrawOp::StrokeRoundedRect {
        x: SIDE_MARGIN,
        y,
        w: w - 2.0 * SIDE_MARGIN,
        h: BOX_HEIGHT,
        r: BOX_RADIUS,
        line_width: 0.3,
        color: BOX_STROKE,
    });

    y += 6.0;
    for point in &config.scanning_points {
        let wrapped = BULLET
            .font
            .wrap(&format!("• {}", point), BULLET.size, w - BULLET_WRAP_INSET);
        page.lines(&wrapped, SIDE_MARGIN + 2.0, y, BULLET);
        y += wrapped.len() as f32 * BULLET_ADVANCE;
    }

    y += 6.0;
    page.text(HOLDER_HEADING, center, y, HEADING);

    y += 8.0;
    let details = holder_details(ticket);
    for (label, value) in &details {
        page.text(format!("{}:", label), DETAIL_LEFT, y, LABEL);
        page.text(value.clone(), DETAIL_LEFT + DETAIL_LABEL_WIDTH, y, VALUE);
        y += DETAIL_SPACING;
    }

    page.text(config.footer.clone(), center, h - FOOTER_INSET, FOOTER);

    Ok(TicketLayout {
        width: w,
        height: h,
        ops: page.ops,
        details,
    })
}
