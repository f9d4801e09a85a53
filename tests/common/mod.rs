#![allow(dead_code)]
use std::path::PathBuf;

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path =
        PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    path.push("tests/fixtures");
    path.push(name);
    path
}

pub const MONOSAT: u32 = 0x26C;
pub const MULTISAT: u32 = 0x35A;
pub const CS_2_SAT: u32 = 0x443;
pub const CS_10_SAT: u32 = 0x575;
pub const CS_17_SAT: u32 = 0x62F;

/// MSB-first bit writer for building frames.
#[derive(Default)]
pub struct BitWriter {
    bits: Vec<bool>,
}

impl BitWriter {
    pub fn put(&mut self, value: u64, width: usize) -> &mut Self {
        assert!(width == 64 || value < (1 << width), "{value} overflows {width} bits");
        for shift in (0..width).rev() {
            self.bits.push((value >> shift) & 1 == 1);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn pad_to(&mut self, len: usize) -> &mut Self {
        assert!(self.bits.len() <= len);
        self.bits.resize(len, false);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        assert_eq!(self.bits.len() % 8, 0, "not byte aligned");
        self.bits
            .chunks(8)
            .map(|c| c.iter().fold(0u8, |acc, b| (acc << 1) | u8::from(*b)))
            .collect()
    }
}

/// Raw orbital element counters.
#[derive(Clone, Copy)]
pub struct Sat {
    pub address: u8,
    pub date: u64,
    pub longitude: u64,
    pub drift: u64,
    pub period: u64,
    pub axis: u64,
    pub decay: u64,
    pub inclination: u64,
}

impl Sat {
    /// 2025-05-15T12:00:00Z, axis 6789 km, incl 98.7, lon 123.4, drift -25,
    /// period 96.5, decay 0.5.
    pub fn sample(address: u8) -> Self {
        Sat {
            address,
            date: 1_355_788_800,
            longitude: 123_400,
            drift: 3000,
            period: 120_110,
            axis: 410_863,
            decay: 5,
            inclination: 98_700,
        }
    }

    fn write(&self, w: &mut BitWriter) {
        w.put(self.address.into(), 8)
            .put(self.date, 35)
            .put(self.longitude, 19)
            .put(self.drift, 13)
            .put(self.period, 18)
            .put(self.axis, 20)
            .put(self.decay, 10)
            .put(self.inclination, 18);
    }
}

pub fn monosat(w: &mut BitWriter, sat: &Sat) {
    let start = w.len();
    w.put(0x12, 8).put(MONOSAT.into(), 32);
    sat.write(w);
    w.put(0, 1).put(0xBEEF, 16);
    w.pad_to(start + 200);
}

/// Multisat frame; unused relative slots are zero filled.
pub fn multisat(w: &mut BitWriter, sat: &Sat, relatives: &[(u8, u64)]) {
    assert!(relatives.len() <= 4);
    let start = w.len();
    w.put(0x12, 8).put(MULTISAT.into(), 32);
    sat.write(w);
    for (address, counter) in relatives {
        w.put((*address).into(), 8).put(*counter, 17);
    }
    w.pad_to(start + 40 + 141 + 4 * 25);
    w.put(0xBEEF, 16).pad_to(start + 304);
}

/// Constellation status frame; `statuses` are (address, payload code, uplink, downlink)
/// and unused slots are zero filled.
pub fn status(w: &mut BitWriter, format: u32, statuses: &[(u8, u8, bool, bool)]) {
    let (count, len) = match format {
        CS_2_SAT => (2, 104),
        CS_10_SAT => (10, 200),
        CS_17_SAT => (17, 304),
        _ => panic!("not a status format: {format:#X}"),
    };
    assert!(statuses.len() <= count);
    let start = w.len();
    w.put(0x12, 8).put(format.into(), 32);
    w.put(1, 6).put(1, 3).put(1, 3);
    for (address, payload, uplink, downlink) in statuses {
        w.put((*address).into(), 8)
            .put((*payload).into(), 3)
            .put((*uplink).into(), 1)
            .put((*downlink).into(), 1);
    }
    w.pad_to(start + 52 + count * 13);
    if format == CS_2_SAT {
        w.put(0, 5);
    }
    w.put(0xBEEF, 16).pad_to(start + len);
}

/// Relative date counter for an offset of `seconds` from the reference.
pub fn relative_counter(seconds: f64) -> u64 {
    ((seconds + 8200.0) / 0.125) as u64
}
