use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use futures_util::future::BoxFuture;
use image::{DynamicImage, Rgb, RgbImage};
use manga_translator_rust::layout::{classify, plan_repair};
use manga_translator_rust::{
    BBox, Detection, Detector, FontResource, OverlayStyle, PageTranslator, Recognizer,
    TranslateOptions, Translator, Typesetter,
};

const BACKGROUND: Rgb<u8> = Rgb([60, 60, 60]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Detector and recognizer over a fixed list of annotated boxes.
struct Annotated(Vec<(BBox, &'static str)>);

impl Annotated {
    fn new(entries: &[((i32, i32, i32, i32), &'static str)]) -> Self {
        Self(
            entries
                .iter()
                .map(|((x1, y1, x2, y2), text)| (BBox::new(*x1, *y1, *x2, *y2).expect("bbox"), *text))
                .collect(),
        )
    }
}

impl Detector for Annotated {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<Detection>> {
        Ok(self
            .0
            .iter()
            .map(|(bbox, _)| Detection {
                bbox: *bbox,
                class_id: 3,
            })
            .collect())
    }
}

impl Recognizer for Annotated {
    fn recognize(&self, _crop: &DynamicImage, bbox: &BBox) -> Result<String> {
        self.0
            .iter()
            .find(|(candidate, _)| candidate == bbox)
            .map(|(_, text)| text.to_string())
            .ok_or_else(|| anyhow!("no text"))
    }

    fn is_valid(&self, text: &str, _crop: &DynamicImage) -> bool {
        !text.trim().is_empty()
    }

    fn is_plausible_script(&self, _text: &str) -> bool {
        true
    }
}

#[derive(Default)]
struct Scripted {
    calls: Mutex<Vec<String>>,
    failing: Vec<&'static str>,
}

impl Scripted {
    fn failing(failing: &[&'static str]) -> Self {
        Self {
            failing: failing.to_vec(),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }
}

impl Translator for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn translate<'a>(
        &'a self,
        text: &'a str,
        _source_lang: &'a str,
        _target_lang: &'a str,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.calls.lock().expect("calls").push(text.to_string());
            if self.failing.iter().any(|failing| *failing == text) {
                return Err(anyhow!("provider rejected the request"));
            }
            Ok(match text {
                "元気？" | "元気?" => "Are you okay?".to_string(),
                "やめろ" => "Stop it!".to_string(),
                "ドゴゴゴ" => "dogogogo!".to_string(),
                "行くぞ！" => "Let's go!".to_string(),
                other => format!("[{}]", other),
            })
        })
    }
}

fn page_translator(translator: Arc<Scripted>) -> PageTranslator {
    PageTranslator::new(
        translator,
        Arc::new(Typesetter::new(
            FontResource::bundled(),
            OverlayStyle::default(),
        )),
        TranslateOptions::default(),
        3,
    )
}

fn page() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 400, BACKGROUND))
}

#[tokio::test]
async fn near_duplicate_sentences_are_translated_once() {
    let translator = Arc::new(Scripted::default());
    let regions = Annotated::new(&[
        ((20, 20, 140, 120), "元気？"),
        ((160, 20, 280, 120), "元気?"),
    ]);
    let outcome = page_translator(Arc::clone(&translator))
        .translate_page(page(), &regions, &regions)
        .await
        .expect("page");

    assert_eq!(translator.calls().len(), 1);
    assert_eq!(outcome.translated, 1);
    assert_eq!(outcome.translations.len(), 2);
    assert!(
        outcome
            .translations
            .iter()
            .all(|translation| translation.translated_text == "Are you okay?")
    );
}

#[tokio::test]
async fn punctuation_only_region_is_never_sent_or_drawn() {
    let translator = Arc::new(Scripted::default());
    let regions = Annotated::new(&[((20, 20, 140, 120), "。")]);
    let image = page();
    let outcome = page_translator(Arc::clone(&translator))
        .translate_page(image.clone(), &regions, &regions)
        .await
        .expect("page");

    assert!(translator.calls().is_empty());
    assert!(outcome.translations.is_empty());
    assert_eq!(outcome.image, image);
}

#[tokio::test]
async fn sound_effects_are_uppercased_and_marked() {
    let translator = Arc::new(Scripted::default());
    let regions = Annotated::new(&[((20, 200, 280, 380), "ドゴゴゴ")]);
    let outcome = page_translator(translator)
        .translate_page(page(), &regions, &regions)
        .await
        .expect("page");

    assert_eq!(outcome.translations.len(), 1);
    assert_eq!(outcome.translations[0].translated_text, "*DOGOGOGO!*");
}

#[tokio::test]
async fn small_regions_are_repainted_last() {
    let translator = Arc::new(Scripted::default());
    let regions = Annotated::new(&[
        ((0, 0, 300, 250), "行くぞ！"),
        ((100, 300, 200, 400), "やめろ"),
    ]);
    let outcome = page_translator(translator)
        .translate_page(page(), &regions, &regions)
        .await
        .expect("page");

    let small = outcome
        .translations
        .iter()
        .find(|translation| translation.bbox.area() == 10_000)
        .expect("small region");
    assert_eq!(classify(small), (1.25, 3));

    let plan = plan_repair(&outcome.translations);
    let paint_order: Vec<usize> = plan
        .iter()
        .rev()
        .map(|request| request.region_translation.region_id)
        .collect();
    assert_eq!(paint_order, vec![0, 1]);
}

#[tokio::test]
async fn failed_translation_leaves_the_region_untouched() {
    let translator = Arc::new(Scripted::failing(&["やめろ"]));
    let regions = Annotated::new(&[
        ((20, 20, 140, 120), "やめろ"),
        ((160, 20, 280, 120), "元気？"),
    ]);
    let image = page();
    let outcome = page_translator(Arc::clone(&translator))
        .translate_page(image.clone(), &regions, &regions)
        .await
        .expect("page");

    assert_eq!(translator.calls().len(), 2);
    assert_eq!(outcome.translated, 1);
    assert_eq!(outcome.translations.len(), 1);
    assert_eq!(outcome.translations[0].region_id, 1);

    let before = image.to_rgb8();
    let after = outcome.image.to_rgb8();
    for y in 20..120 {
        for x in 20..140 {
            assert_eq!(after.get_pixel(x, y), before.get_pixel(x, y));
        }
    }
    assert_eq!(after.get_pixel(162, 22), &WHITE);
    assert_eq!(after.get_pixel(150, 200), &BACKGROUND);
}

#[tokio::test]
async fn translations_follow_reading_order() {
    let translator = Arc::new(Scripted::default());
    let regions = Annotated::new(&[
        ((10, 10, 90, 60), "おはよう"),
        ((200, 30, 290, 80), "ありがとう"),
        ((100, 200, 200, 260), "さようなら"),
    ]);
    let outcome = page_translator(translator)
        .translate_page(page(), &regions, &regions)
        .await
        .expect("page");

    let summary: Vec<String> = outcome
        .translations
        .iter()
        .map(|translation| format!("{} {}", translation.region_id, translation.translated_text))
        .collect();
    insta::assert_snapshot!(summary.join("\n"), @r"
    1 [ありがとう]
    0 [おはよう]
    2 [さようなら]
    ");
}
