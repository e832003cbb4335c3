//! PDF serialization of a [`TicketLayout`], and reading text back out of it.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use super::fonts::{decode_win_ansi, encode_win_ansi, Font, PT_PER_MM};
use super::layout::{Align, DrawOp, Rgb, TicketLayout};
use super::qr::QrRaster;
use super::DocumentError;

const QR_RESOURCE: &str = "Im1";

/// Cubic Bézier handle length for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Maps layout millimetres (top-left origin) to PDF points (bottom-left).
struct PageSpace {
    height_mm: f32,
}

impl PageSpace {
    fn x(&self, mm: f32) -> f32 {
        mm * PT_PER_MM
    }

    fn y(&self, mm: f32) -> f32 {
        (self.height_mm - mm) * PT_PER_MM
    }

    fn len(&self, mm: f32) -> f32 {
        mm * PT_PER_MM
    }
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![
        (f32::from(color.0) / 255.0).into(),
        (f32::from(color.1) / 255.0).into(),
        (f32::from(color.2) / 255.0).into(),
    ]
}

fn move_to(x: f32, y: f32) -> Operation {
    op("m", vec![x.into(), y.into()])
}

fn line_to(x: f32, y: f32) -> Operation {
    op("l", vec![x.into(), y.into()])
}

fn curve_to(points: [f32; 6]) -> Operation {
    op("c", points.iter().map(|&v| v.into()).collect())
}

/// Closed circle path in page points.
fn circle_path(cx: f32, cy: f32, r: f32) -> Vec<Operation> {
    let k = r * KAPPA;
    vec![
        move_to(cx + r, cy),
        curve_to([cx + r, cy + k, cx + k, cy + r, cx, cy + r]),
        curve_to([cx - k, cy + r, cx - r, cy + k, cx - r, cy]),
        curve_to([cx - r, cy - k, cx - k, cy - r, cx, cy - r]),
        curve_to([cx + k, cy - r, cx + r, cy - k, cx + r, cy]),
        op("h", vec![]),
    ]
}

/// Closed rounded rectangle path in page points; (x, y) is the lower-left corner.
fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, r: f32) -> Vec<Operation> {
    let r = r.min(w / 2.0).min(h / 2.0);
    let k = r * KAPPA;
    let (right, top) = (x + w, y + h);
    vec![
        move_to(x + r, y),
        line_to(right - r, y),
        curve_to([right - r + k, y, right, y + r - k, right, y + r]),
        line_to(right, top - r),
        curve_to([right, top - r + k, right - r + k, top, right - r, top]),
        line_to(x + r, top),
        curve_to([x + r - k, top, x, top - r + k, x, top - r]),
        line_to(x, y + r),
        curve_to([x, y + r - k, x + r - k, y, x + r, y]),
        op("h", vec![]),
    ]
}

fn draw_ops(layout: &TicketLayout) -> Vec<Operation> {
    let space = PageSpace {
        height_mm: layout.height,
    };
    let mut ops = Vec::new();

    for draw in &layout.ops {
        match draw {
            DrawOp::FillRect { x, y, w, h, color } => {
                ops.push(op("rg", color_operands(*color)));
                ops.push(op(
                    "re",
                    vec![
                        space.x(*x).into(),
                        space.y(y + h).into(),
                        space.len(*w).into(),
                        space.len(*h).into(),
                    ],
                ));
                ops.push(op("f", vec![]));
            }
            DrawOp::FillTriangle { points, color } => {
                ops.push(op("rg", color_operands(*color)));
                let [a, b, c] = points;
                ops.push(move_to(space.x(a.0), space.y(a.1)));
                ops.push(line_to(space.x(b.0), space.y(b.1)));
                ops.push(line_to(space.x(c.0), space.y(c.1)));
                ops.push(op("h", vec![]));
                ops.push(op("f", vec![]));
            }
            DrawOp::FillCircle { cx, cy, r, color } => {
                ops.push(op("rg", color_operands(*color)));
                ops.extend(circle_path(space.x(*cx), space.y(*cy), space.len(*r)));
                ops.push(op("f", vec![]));
            }
            DrawOp::StrokeRoundedRect {
                x,
                y,
                w,
                h,
                r,
                line_width,
                color,
            } => {
                ops.push(op("RG", color_operands(*color)));
                ops.push(op("w", vec![space.len(*line_width).into()]));
                ops.extend(rounded_rect_path(
                    space.x(*x),
                    space.y(y + h),
                    space.len(*w),
                    space.len(*h),
                    space.len(*r),
                ));
                ops.push(op("S", vec![]));
            }
            DrawOp::QrImage { x, y, size } => {
                let side = space.len(*size);
                ops.push(op("q", vec![]));
                ops.push(op(
                    "cm",
                    vec![
                        side.into(),
                        0.into(),
                        0.into(),
                        side.into(),
                        space.x(*x).into(),
                        space.y(y + size).into(),
                    ],
                ));
                ops.push(op("Do", vec![Object::Name(QR_RESOURCE.as_bytes().to_vec())]));
                ops.push(op("Q", vec![]));
            }
            DrawOp::Text {
                text,
                x,
                y,
                font,
                size,
                color,
                align,
            } => {
                let left = match align {
                    Align::Left => *x,
                    Align::Center => x - font.text_width_mm(text, *size) / 2.0,
                };
                ops.push(op("rg", color_operands(*color)));
                ops.push(op("BT", vec![]));
                ops.push(op(
                    "Tf",
                    vec![
                        Object::Name(font.resource_name().as_bytes().to_vec()),
                        (*size).into(),
                    ],
                ));
                ops.push(op("Td", vec![space.x(left).into(), space.y(*y).into()]));
                ops.push(op(
                    "Tj",
                    vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
                ));
                ops.push(op("ET", vec![]));
            }
        }
    }

    ops
}

fn font_dictionary(font: Font) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Serialize the layout into a single-page PDF with the QR embedded as a
/// Flate-compressed RGB image.
pub fn write_pdf(
    layout: &TicketLayout,
    qr: &QrRaster,
    title: &str,
) -> Result<Vec<u8>, DocumentError> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary(Font::Helvetica));
    let bold_id = doc.add_object(font_dictionary(Font::HelveticaBold));

    let mut image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(qr.size),
            "Height" => i64::from(qr.size),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        qr.rgb.clone(),
    );
    image.compress()?;
    let image_id = doc.add_object(image);

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Helvetica.resource_name() => regular_id,
            Font::HelveticaBold.resource_name() => bold_id,
        },
        "XObject" => dictionary! {
            QR_RESOURCE => image_id,
        },
    });

    let content = Content {
        operations: draw_ops(layout),
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (layout.width * PT_PER_MM).into(),
            (layout.height * PT_PER_MM).into(),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal(concat!("gatepass ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// A string shown on the page, with the font it was set in.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub size: f32,
}

/// Read every text run of a generated ticket in content-stream order.
pub fn read_text_runs(pdf: &[u8]) -> Result<Vec<TextRun>, DocumentError> {
    let doc = Document::load_mem(pdf)?;
    let bold_name = Font::HelveticaBold.resource_name().as_bytes();

    let mut runs = Vec::new();
    for page_id in doc.get_pages().into_values() {
        let content = Content::decode(&doc.get_page_content(page_id)?)?;

        let mut bold = false;
        let mut size = 0.0;
        for operation in content.operations {
            match operation.operator.as_str() {
                "Tf" => {
                    if let [Object::Name(name), font_size] = operation.operands.as_slice() {
                        bold = name.as_slice() == bold_name;
                        size = font_size.as_float().unwrap_or(0.0);
                    }
                }
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operation.operands.first() {
                        runs.push(TextRun {
                            text: decode_win_ansi(bytes),
                            bold,
                            size,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    Ok(runs)
}
