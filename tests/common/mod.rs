#![allow(dead_code)]

use pdf_textfit::{
    DynamicFitSetting, FitAxis, FontSet, Mm, MonospaceMetrics, Pt, TextField, TextStyle,
};

/// Every character is 500 units wide in a 1000-unit em, so at 10pt each one is 5pt
pub const MONO: MonospaceMetrics = MonospaceMetrics {
    units_per_em: 1000.0,
    advance: 500.0,
    ascender: 800.0,
    descender: -200.0,
};

pub fn fonts() -> FontSet {
    FontSet::builder()
        .add("Mono", MONO, true)
        .add("Narrow", MonospaceMetrics::new(400.0, 800.0, -200.0), false)
        .build()
        .expect("one fallback font")
}

/// A field with its box given in points
pub fn field(width: f32, height: f32, font_size: f32) -> TextField {
    TextField {
        width: Mm::from(Pt(width)),
        height: Mm::from(Pt(height)),
        style: TextStyle {
            font_size: Pt(font_size),
            ..Default::default()
        },
        dynamic_font_size: None,
    }
}

pub fn fitted(width: f32, height: f32, font_size: f32, min: f32, max: f32, axis: FitAxis) -> TextField {
    TextField {
        dynamic_font_size: Some(DynamicFitSetting::new(Pt(min), Pt(max), axis)),
        ..field(width, height, font_size)
    }
}

pub fn approx(a: Pt, b: Pt) -> bool {
    (a - b).abs() < Pt(1e-2)
}
