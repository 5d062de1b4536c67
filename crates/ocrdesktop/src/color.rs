//! Naming the dominant colors of word boxes.
//!
//! Blind and low-vision users cannot tell whether a recognized button is
//! greyed out or highlighted; reporting the dominant colors of each word
//! box in plain language fills that gap. RGB values are mapped to their
//! nearest CSS3 color name; lookups are memoized because screenshots
//! repeat the same handful of colors thousands of times.

use ahash::AHashMap;
use image::DynamicImage;
use std::sync::Mutex;

/// CSS3 extended color keywords.
const CSS3_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

/// Names the dominant colors of image regions.
pub struct ColorDetector {
    max_colors: usize,
    cache: Mutex<AHashMap<[u8; 3], &'static str>>,
}

impl ColorDetector {
    pub fn new(max_colors: usize) -> Self {
        Self {
            max_colors,
            cache: Mutex::new(AHashMap::new()),
        }
    }

    /// Name the nearest CSS3 color for an RGB value.
    pub fn name_color(&self, rgb: [u8; 3]) -> &'static str {
        if let Some(name) = self.cache.lock().expect("color cache lock").get(&rgb) {
            return name;
        }

        let name = nearest_css3_name(rgb);
        self.cache.lock().expect("color cache lock").insert(rgb, name);
        name
    }

    /// Describe the dominant colors of a region of `img`.
    ///
    /// Returns strings like `"white: 82 %, black: 14 %"`, limited to
    /// `max_colors` entries, or `"unknown"` when the region is empty.
    pub fn describe_region(&self, img: &DynamicImage, left: u32, top: u32, width: u32, height: u32) -> String {
        // Geometry comes from parsed TSV and may be arbitrarily large;
        // compare widened so the bounds check itself cannot overflow.
        if width == 0
            || height == 0
            || u64::from(left) + u64::from(width) > u64::from(img.width())
            || u64::from(top) + u64::from(height) > u64::from(img.height())
        {
            return "unknown".to_string();
        }

        let region = img.crop_imm(left, top, width, height).to_rgba8();
        let mut counts: AHashMap<&'static str, u64> = AHashMap::new();
        for pixel in region.pixels() {
            let name = self.name_color([pixel.0[0], pixel.0[1], pixel.0[2]]);
            *counts.entry(name).or_insert(0) += 1;
        }

        let total = u64::from(width) * u64::from(height);
        let mut ranked: Vec<(&'static str, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        let mut parts = Vec::new();
        for (name, count) in ranked.into_iter().take(self.max_colors) {
            let percent = ((count as f64 / total as f64) * 100.0).round() as u64;
            if percent > 0 {
                parts.push(format!("{}: {} %", name, percent));
            }
        }

        if parts.is_empty() {
            "unknown".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Nearest CSS3 color by squared Euclidean distance in RGB space.
fn nearest_css3_name(rgb: [u8; 3]) -> &'static str {
    let mut best_name = "black";
    let mut best_distance = u32::MAX;

    for (name, reference) in CSS3_COLORS {
        let dr = i32::from(rgb[0]) - i32::from(reference[0]);
        let dg = i32::from(rgb[1]) - i32::from(reference[1]);
        let db = i32::from(rgb[2]) - i32::from(reference[2]);
        let distance = (dr * dr + dg * dg + db * db) as u32;
        if distance < best_distance {
            best_distance = distance;
            best_name = name;
        }
    }

    best_name
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_exact_colors_resolve_to_themselves() {
        assert_eq!(nearest_css3_name([255, 0, 0]), "red");
        assert_eq!(nearest_css3_name([0, 0, 0]), "black");
        assert_eq!(nearest_css3_name([255, 255, 255]), "white");
        assert_eq!(nearest_css3_name([0, 128, 0]), "green");
    }

    #[test]
    fn test_near_colors_snap_to_nearest() {
        assert_eq!(nearest_css3_name([250, 5, 5]), "red");
        assert_eq!(nearest_css3_name([3, 3, 3]), "black");
    }

    #[test]
    fn test_cache_returns_same_name() {
        let detector = ColorDetector::new(3);
        let first = detector.name_color([250, 5, 5]);
        let second = detector.name_color([250, 5, 5]);
        assert_eq!(first, second);
        assert_eq!(first, "red");
    }

    #[test]
    fn test_describe_solid_region() {
        let mut img = RgbaImage::new(10, 10);
        for pixel in img.pixels_mut() {
            *pixel = Rgba([255, 255, 255, 255]);
        }
        let img = DynamicImage::ImageRgba8(img);

        let detector = ColorDetector::new(3);
        assert_eq!(detector.describe_region(&img, 0, 0, 10, 10), "white: 100 %");
    }

    #[test]
    fn test_describe_mixed_region_orders_by_count() {
        let mut img = RgbaImage::new(10, 10);
        for (x, _, pixel) in img.enumerate_pixels_mut() {
            // 70 white columns, 30 black.
            *pixel = if x < 7 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            };
        }
        let img = DynamicImage::ImageRgba8(img);

        let detector = ColorDetector::new(3);
        assert_eq!(detector.describe_region(&img, 0, 0, 10, 10), "white: 70 %, black: 30 %");
    }

    #[test]
    fn test_describe_respects_max_colors() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 255]));
        img.put_pixel(2, 0, Rgba([0, 0, 255, 255]));
        let img = DynamicImage::ImageRgba8(img);

        let detector = ColorDetector::new(1);
        let description = detector.describe_region(&img, 0, 0, 3, 1);
        assert_eq!(description.matches('%').count(), 1);
    }

    #[test]
    fn test_describe_out_of_bounds_region() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        let detector = ColorDetector::new(3);
        assert_eq!(detector.describe_region(&img, 2, 2, 10, 10), "unknown");
        assert_eq!(detector.describe_region(&img, 0, 0, 0, 4), "unknown");
    }

    #[test]
    fn test_describe_huge_region_does_not_overflow() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        let detector = ColorDetector::new(3);
        assert_eq!(detector.describe_region(&img, u32::MAX, 0, 2, 2), "unknown");
        assert_eq!(detector.describe_region(&img, 0, u32::MAX - 1, 2, u32::MAX), "unknown");
    }
}
