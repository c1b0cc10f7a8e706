//! PDF page text and image access using lopdf and pdf-extract.

use image::{imageops, DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// Points per inch in PDF user space.
const POINTS_PER_INCH: f32 = 72.0;

/// PDF page extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.document()?
            .get_pages()
            .get(&page)
            .copied()
            .ok_or(PdfError::InvalidPage(page))
    }

    /// Page width in points, from the (possibly inherited) MediaBox.
    fn page_width_points(&self, doc: &Document, page_id: ObjectId) -> Option<f32> {
        let media_box = inherited_attribute(doc, page_id, b"MediaBox")?;
        let coords = doc.dereference(media_box).ok()?.1.as_array().ok()?;
        let x0 = coords.first()?.as_float().ok()?;
        let x1 = coords.get(2)?.as_float().ok()?;
        Some((x1 - x0).abs())
    }

    /// Every decodable image in the document, in object order.
    fn document_images(&self, doc: &Document) -> Vec<DynamicImage> {
        let images: Vec<DynamicImage> = doc
            .objects
            .values()
            .filter_map(|object| decode_image(doc, object))
            .collect();
        debug!("Found {} images in document", images.len());
        images
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the raw bytes, so keep the decrypted form.
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;
        let pages = pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        pages
            .into_iter()
            .nth((page - 1) as usize)
            .ok_or(PdfError::InvalidPage(page))
    }

    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage> {
        let page_id = self.page_id(page)?;
        let doc = self.document()?;

        let largest = self
            .page_images(page)?
            .into_iter()
            .max_by_key(|img| img.width() as u64 * img.height() as u64);

        let image = match largest {
            Some(image) => image,
            None => {
                debug!("No images placed on page {}, falling back to document images", page);
                let mut all_images = self.document_images(doc);
                let page_idx = (page - 1) as usize;
                if page_idx < all_images.len() {
                    all_images.swap_remove(page_idx)
                } else {
                    all_images.into_iter().next().ok_or_else(|| {
                        PdfError::ImageExtraction("No images found in PDF".to_string())
                    })?
                }
            }
        };

        // Scans are embedded at their own resolution; only upscale to reach
        // the requested density.
        let Some(width_pt) = self.page_width_points(doc, page_id).filter(|w| *w > 0.0) else {
            return Ok(image);
        };
        let target_width = (width_pt / POINTS_PER_INCH * dpi as f32).round() as u32;
        if target_width <= image.width() {
            debug!(
                "Page {} image {}x{} already meets {} dpi",
                page,
                image.width(),
                image.height(),
                dpi
            );
            return Ok(image);
        }

        let scale = target_width as f32 / image.width() as f32;
        let target_height = ((image.height() as f32 * scale).round() as u32).max(1);
        debug!(
            "Upscaling page {} image {}x{} to {}x{} for {} dpi",
            page,
            image.width(),
            image.height(),
            target_width,
            target_height,
            dpi
        );
        Ok(image.resize_exact(target_width, target_height, imageops::FilterType::Lanczos3))
    }

    fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let page_id = self.page_id(page)?;
        let doc = self.document()?;

        let mut images = Vec::new();
        let xobjects = inherited_attribute(doc, page_id, b"Resources")
            .and_then(|res| doc.dereference(res).ok())
            .and_then(|(_, res)| res.as_dict().ok())
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|xobj| doc.dereference(xobj).ok())
            .and_then(|(_, xobj)| xobj.as_dict().ok());

        if let Some(xobjects) = xobjects {
            for (name, obj_ref) in xobjects.iter() {
                let Ok((_, obj)) = doc.dereference(obj_ref) else {
                    continue;
                };
                if let Some(img) = decode_image(doc, obj) {
                    trace!("Decoded XObject {}", String::from_utf8_lossy(name));
                    images.push(img);
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }
}

/// Look up a page attribute, walking up the page tree for inherited values.
fn inherited_attribute<'a>(doc: &'a Document, node_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node: &Dictionary = doc.get_dictionary(node_id).ok()?;
    loop {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
}

/// Decode an image XObject stream: JPEG data, or 8-bit raw RGB or gray samples.
fn decode_image(doc: &Document, obj: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = obj else {
        return None;
    };
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    trace!("Found image object: {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|filter| match filter {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(arr) => arr.last().and_then(|o| o.as_name().ok()),
        _ => None,
    });
    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!("Skipping unsupported image filter");
            return None;
        }
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            Object::Reference(r) => doc.get_object(*r).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    let pixels = (width as usize) * (height as usize);

    match color_space {
        b"DeviceGray" | b"G" if data.len() >= pixels => {
            GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8)
        }
        b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
            RgbImage::from_raw(width, height, data[..pixels * 3].to_vec()).map(DynamicImage::ImageRgb8)
        }
        _ => {
            trace!(
                "Could not decode image: colorspace={}, data_len={}",
                String::from_utf8_lossy(color_space),
                data.len()
            );
            None
        }
    }
}
