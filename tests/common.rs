/// Builder for small, well-formed TrueType fonts with known table values.
///
/// The default font has four glyphs and two long horizontal metrics:
///
/// | gid | name      | bbox                   | advance | lsb |
/// |-----|-----------|------------------------|---------|-----|
/// | 0   | `.notdef` | (50, 0) - (450, 700)   | 500     | 50  |
/// | 1   | `space`   | empty                  | 250     | 0   |
/// | 2   | `H`       | (60, 0) - (640, 700)   | 250     | 60  |
/// | 3   | `x`       | (40, -10) - (460, 500) | 250     | 40  |
///
/// Glyphs 2 and 3 sit past the long metrics so they share the advance of glyph 1.
#[derive(Clone, Debug)]
pub struct SyntheticFont {
    pub units_per_em: u16,
    pub font_bbox: [i16; 4],
    pub ascender: i16,
    pub descender: i16,
    /// `(advance, lsb)` for every glyph. Only the lsb is written past `num_h_metrics`.
    pub h_metrics: Vec<(u16, i16)>,
    pub num_h_metrics: u16,
    /// `(advance height, top side bearing)` long vertical metrics, written with `vhea`.
    pub v_metrics: Option<Vec<(u16, i16)>>,
    /// Bounding box per glyph, `None` for a glyph without an outline.
    pub glyphs: Vec<Option<[i16; 4]>>,
    pub glyph_names: Vec<&'static str>,
    /// Windows Unicode BMP mappings, `(code, glyph id)`.
    pub windows_cmap: Vec<(u16, u16)>,
    /// Macintosh Roman mappings, `(code, glyph id)`.
    pub mac_cmap: Vec<(u8, u16)>,
    pub family_name: &'static str,
    pub postscript_name: &'static str,
    pub italic_angle: i32,
    pub is_fixed_pitch: bool,
    pub weight_class: u16,
    pub width_class: u16,
    pub family_class: i16,
    pub x_height: i16,
    pub cap_height: i16,
    pub omit_tables: Vec<u32>,
}

const fn tag(bytes: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*bytes)
}

impl Default for SyntheticFont {
    fn default() -> Self {
        SyntheticFont {
            units_per_em: 1000,
            font_bbox: [-50, -200, 1000, 900],
            ascender: 800,
            descender: -200,
            h_metrics: vec![(500, 50), (250, 0), (0, 60), (0, 40)],
            num_h_metrics: 2,
            v_metrics: None,
            glyphs: vec![
                Some([50, 0, 450, 700]),
                None,
                Some([60, 0, 640, 700]),
                Some([40, -10, 460, 500]),
            ],
            glyph_names: vec![".notdef", "space", "H", "x"],
            windows_cmap: vec![(0x20, 1), (0x48, 2), (0x78, 3)],
            mac_cmap: Vec::new(),
            family_name: "Synthetic",
            postscript_name: "Synthetic-Regular",
            italic_angle: 0,
            is_fixed_pitch: false,
            weight_class: 400,
            width_class: 5,
            family_class: 0x0105,
            x_height: 480,
            cap_height: 690,
            omit_tables: Vec::new(),
        }
    }
}

/// Big-endian byte sink.
#[derive(Default)]
struct Bytes(Vec<u8>);

impl Bytes {
    fn u8(&mut self, value: u8) -> &mut Self {
        self.0.push(value);
        self
    }

    fn u16(&mut self, value: u16) -> &mut Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    fn i16(&mut self, value: i16) -> &mut Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    fn i32(&mut self, value: i32) -> &mut Self {
        self.0.extend_from_slice(&value.to_be_bytes());
        self
    }

    fn bytes(&mut self, data: &[u8]) -> &mut Self {
        self.0.extend_from_slice(data);
        self
    }

    fn zeros(&mut self, count: usize) -> &mut Self {
        self.0.resize(self.0.len() + count, 0);
        self
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

impl SyntheticFont {
    pub fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }

    /// Assemble the font, with the table directory sorted by tag and correct checksums.
    pub fn build(&self) -> Vec<u8> {
        let mut tables = vec![
            (tag(b"head"), self.head()),
            (tag(b"hhea"), self.hhea()),
            (tag(b"maxp"), self.maxp()),
            (tag(b"hmtx"), self.hmtx()),
            (tag(b"loca"), self.loca()),
            (tag(b"glyf"), self.glyf()),
            (tag(b"cmap"), self.cmap()),
            (tag(b"name"), self.name()),
            (tag(b"post"), self.post()),
            (tag(b"OS/2"), self.os2()),
        ];
        if let Some(v_metrics) = &self.v_metrics {
            tables.push((tag(b"vhea"), self.vhea(v_metrics.len() as u16)));
            tables.push((tag(b"vmtx"), self.vmtx(v_metrics)));
        }
        tables.retain(|(tag, _)| !self.omit_tables.contains(tag));
        tables.sort_by_key(|(tag, _)| *tag);

        let num_tables = tables.len() as u16;
        let mut font = Bytes::default();
        font.u32(0x00010000)
            .u16(num_tables)
            .u16(0)
            .u16(0)
            .u16(0);

        let mut offset = 12 + 16 * tables.len();
        let mut body = Bytes::default();
        for (tag, data) in &tables {
            font.u32(*tag)
                .u32(checksum(data))
                .u32(offset as u32)
                .u32(data.len() as u32);
            body.bytes(data);
            let padding = (4 - data.len() % 4) % 4;
            body.zeros(padding);
            offset += data.len() + padding;
        }
        font.bytes(&body.0);
        font.0
    }

    fn head(&self) -> Vec<u8> {
        let [x_min, y_min, x_max, y_max] = self.font_bbox;
        let mut data = Bytes::default();
        data.u16(1)
            .u16(0)
            .i32(0x00010000) // font revision
            .u32(0) // checkSumAdjustment
            .u32(0x5F0F3CF5)
            .u16(0) // flags
            .u16(self.units_per_em)
            .zeros(16) // created and modified
            .i16(x_min)
            .i16(y_min)
            .i16(x_max)
            .i16(y_max)
            .u16(0) // macStyle
            .u16(8) // lowestRecPPEM
            .i16(2) // fontDirectionHint
            .i16(0) // short loca offsets
            .i16(0);
        data.0
    }

    fn hhea_like(&self, ascender: i16, descender: i16, num_metrics: u16) -> Vec<u8> {
        let mut data = Bytes::default();
        data.u16(1).u16(0).i16(ascender).i16(descender).i16(0); // line gap
        data.u16(1000) // advance max
            .i16(0)
            .i16(0)
            .i16(1000)
            .i16(1) // caret slope rise
            .i16(0)
            .i16(0)
            .zeros(8) // reserved
            .i16(0) // metric data format
            .u16(num_metrics);
        data.0
    }

    fn hhea(&self) -> Vec<u8> {
        self.hhea_like(self.ascender, self.descender, self.num_h_metrics)
    }

    fn vhea(&self, num_v_metrics: u16) -> Vec<u8> {
        self.hhea_like(500, -500, num_v_metrics)
    }

    fn maxp(&self) -> Vec<u8> {
        let mut data = Bytes::default();
        data.u32(0x00005000).u16(self.num_glyphs());
        data.0
    }

    fn hmtx(&self) -> Vec<u8> {
        let mut data = Bytes::default();
        for (index, &(advance, lsb)) in self.h_metrics.iter().enumerate() {
            if index < usize::from(self.num_h_metrics) {
                data.u16(advance);
            }
            data.i16(lsb);
        }
        data.0
    }

    fn vmtx(&self, v_metrics: &[(u16, i16)]) -> Vec<u8> {
        let mut data = Bytes::default();
        for &(advance, tsb) in v_metrics {
            data.u16(advance).i16(tsb);
        }
        // Top side bearings for the glyphs past the long metrics
        for _ in v_metrics.len()..self.glyphs.len() {
            data.i16(0);
        }
        data.0
    }

    fn glyph_data(&self) -> (Vec<u8>, Vec<u16>) {
        let mut data = Bytes::default();
        let mut offsets = vec![0];
        for glyph in &self.glyphs {
            if let Some([x_min, y_min, x_max, y_max]) = *glyph {
                data.i16(1).i16(x_min).i16(y_min).i16(x_max).i16(y_max);
            }
            offsets.push((data.len() / 2) as u16);
        }
        (data.0, offsets)
    }

    fn loca(&self) -> Vec<u8> {
        let (_, offsets) = self.glyph_data();
        let mut data = Bytes::default();
        for offset in offsets {
            data.u16(offset);
        }
        data.0
    }

    fn glyf(&self) -> Vec<u8> {
        self.glyph_data().0
    }

    fn cmap(&self) -> Vec<u8> {
        let mut subtables = Vec::new();
        if !self.mac_cmap.is_empty() {
            subtables.push((1u16, 0u16, self.format0()));
        }
        if !self.windows_cmap.is_empty() {
            subtables.push((3, 1, self.format4()));
        }

        let mut data = Bytes::default();
        data.u16(0).u16(subtables.len() as u16);
        let mut offset = 4 + 8 * subtables.len();
        for (platform, encoding, subtable) in &subtables {
            data.u16(*platform).u16(*encoding).u32(offset as u32);
            offset += subtable.len();
        }
        for (_, _, subtable) in &subtables {
            data.bytes(subtable);
        }
        data.0
    }

    fn format0(&self) -> Vec<u8> {
        let mut glyph_ids = [0u8; 256];
        for &(code, glyph_id) in &self.mac_cmap {
            glyph_ids[usize::from(code)] = glyph_id as u8;
        }
        let mut data = Bytes::default();
        data.u16(0).u16(262).u16(0).bytes(&glyph_ids);
        data.0
    }

    // One segment per mapping plus the terminating 0xFFFF segment.
    fn format4(&self) -> Vec<u8> {
        let mut mappings = self.windows_cmap.clone();
        mappings.sort();
        let seg_count = mappings.len() as u16 + 1;

        let mut data = Bytes::default();
        data.u16(4)
            .u16(16 + 8 * seg_count)
            .u16(0)
            .u16(seg_count * 2)
            .u16(0)
            .u16(0)
            .u16(0);
        for &(code, _) in &mappings {
            data.u16(code);
        }
        data.u16(0xFFFF).u16(0); // reserved pad
        for &(code, _) in &mappings {
            data.u16(code);
        }
        data.u16(0xFFFF);
        for &(code, glyph_id) in &mappings {
            data.u16(glyph_id.wrapping_sub(code));
        }
        data.u16(1);
        data.zeros(2 * usize::from(seg_count)); // idRangeOffsets
        data.0
    }

    fn name(&self) -> Vec<u8> {
        let full_name = format!("{} Regular", self.family_name);
        let strings: [(u16, &str); 4] = [
            (1, self.family_name),
            (2, "Regular"),
            (4, &full_name),
            (6, self.postscript_name),
        ];

        let mut storage = Bytes::default();
        let mut data = Bytes::default();
        data.u16(0)
            .u16(strings.len() as u16)
            .u16(6 + 12 * strings.len() as u16);
        for (name_id, value) in strings {
            let encoded: Vec<u8> = value.encode_utf16().flat_map(u16::to_be_bytes).collect();
            data.u16(3)
                .u16(1)
                .u16(0x0409)
                .u16(name_id)
                .u16(encoded.len() as u16)
                .u16(storage.len() as u16);
            storage.bytes(&encoded);
        }
        data.bytes(&storage.0);
        data.0
    }

    // Version 2.0 with every name stored as a custom name.
    fn post(&self) -> Vec<u8> {
        let mut data = Bytes::default();
        data.u32(0x00020000)
            .i32(self.italic_angle)
            .i16(-100)
            .i16(50)
            .u32(u32::from(self.is_fixed_pitch))
            .zeros(16)
            .u16(self.glyph_names.len() as u16);
        for index in 0..self.glyph_names.len() {
            data.u16(258 + index as u16);
        }
        for name in &self.glyph_names {
            data.u8(name.len() as u8).bytes(name.as_bytes());
        }
        data.0
    }

    // Version 2, 96 bytes.
    fn os2(&self) -> Vec<u8> {
        let mut data = Bytes::default();
        data.u16(2)
            .i16(500)
            .u16(self.weight_class)
            .u16(self.width_class)
            .u16(0) // fsType
            .zeros(20)
            .i16(self.family_class)
            .zeros(10) // panose
            .zeros(16) // unicode ranges
            .bytes(b"TEST")
            .u16(0x40) // fsSelection: regular
            .u16(0x20)
            .u16(0x78)
            .i16(self.ascender)
            .i16(self.descender)
            .i16(0)
            .u16(self.ascender as u16)
            .u16(self.descender.unsigned_abs())
            .zeros(8) // code page ranges
            .i16(self.x_height)
            .i16(self.cap_height)
            .u16(0)
            .u16(0x20)
            .u16(1);
        data.0
    }
}
