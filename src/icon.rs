use eframe::egui::viewport::IconData;

// Generate the app icon: indigo circular gradient with a white crescent moon
pub fn generate_icon(size: u32) -> IconData {
    let w = size;
    let h = size;
    let mut rgba = vec![0u8; (w * h * 4) as usize];
    let cx = (w as f32) * 0.5;
    let cy = (h as f32) * 0.5;
    let radius = (w.min(h) as f32) * 0.45;

    // Crescent = moon disc minus an offset shadow disc
    let moon_r = radius * 0.62;
    let (moon_x, moon_y) = (cx + radius * 0.08, cy);
    let shadow_r = moon_r * 0.92;
    let (shadow_x, shadow_y) = (moon_x + moon_r * 0.45, moon_y - moon_r * 0.18);

    for y in 0..h {
        for x in 0..w {
            let idx = ((y * w + x) * 4) as usize;

            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let in_circle = dist <= radius;
            let t = (dist / radius).min(1.0);
            // Night-sky gradient: deep indigo center fading to near-black
            let r = lerp(44.0, 12.0, t);
            let g = lerp(36.0, 10.0, t);
            let b = lerp(92.0, 34.0, t);

            rgba[idx] = if in_circle { r as u8 } else { 0 };
            rgba[idx + 1] = if in_circle { g as u8 } else { 0 };
            rgba[idx + 2] = if in_circle { b as u8 } else { 0 };
            rgba[idx + 3] = if in_circle { 255 } else { 0 };

            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            if in_disc(px, py, moon_x, moon_y, moon_r) && !in_disc(px, py, shadow_x, shadow_y, shadow_r) {
                rgba[idx] = 245;
                rgba[idx + 1] = 242;
                rgba[idx + 2] = 225;
                rgba[idx + 3] = 255;
            }
        }
    }

    IconData { rgba, width: w, height: h }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn in_disc(px: f32, py: f32, cx: f32, cy: f32, r: f32) -> bool {
    let dx = px - cx;
    let dy = py - cy;
    dx * dx + dy * dy <= r * r
}
