// NB: only the tags the transformer reads or maps, add here as needed

pub const EXIF_IFD_POINTER: u16 = 0x8769;
pub const GPS_INFO_IFD_POINTER: u16 = 0x8825;
pub const INTEROPERABILITY_IFD_POINTER: u16 = 0xa005;

/// IFD0
pub mod ifd0 {
    pub const IMAGE_DESCRIPTION: u16 = 0x010e;
    pub const MAKE: u16 = 0x010f;
    pub const MODEL: u16 = 0x0110;
    pub const SOFTWARE: u16 = 0x0131;
    pub const DATE_TIME: u16 = 0x0132;
    pub const ARTIST: u16 = 0x013b;
    pub const COPYRIGHT: u16 = 0x8298;
}

/// ExifSubIFD
pub mod exif {
    pub const SAMPLES_PER_PIXEL: u16 = 0x0115;
    pub const EXPOSURE_TIME: u16 = 0x829a;
    pub const F_NUMBER: u16 = 0x829d;
    pub const EXPOSURE_PROGRAM: u16 = 0x8822;
    pub const EXIF_VERSION: u16 = 0x9000;
    pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
    pub const DATE_TIME_DIGITIZED: u16 = 0x9004;
    pub const OFFSET_TIME: u16 = 0x9010;
    pub const OFFSET_TIME_ORIGINAL: u16 = 0x9011;
    pub const OFFSET_TIME_DIGITIZED: u16 = 0x9012;
    pub const FLASHPIX_VERSION: u16 = 0xa000;
    pub const PIXEL_X_DIMENSION: u16 = 0xa002;
    pub const PIXEL_Y_DIMENSION: u16 = 0xa003;
    pub const SENSING_METHOD: u16 = 0xa217;
    pub const IMAGE_UNIQUE_ID: u16 = 0xa420;
    pub const CAMERA_OWNER_NAME: u16 = 0xa430;
}

pub mod gps {
    pub const VERSION_ID: u16 = 0x0000;
    pub const LATITUDE_REF: u16 = 0x0001;
    pub const LATITUDE: u16 = 0x0002;
    pub const LONGITUDE_REF: u16 = 0x0003;
    pub const LONGITUDE: u16 = 0x0004;
}

pub mod thumbnail {
    pub const JPEG_INTERCHANGE_FORMAT: u16 = 0x0201;
    pub const JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 0x0202;
}

/// IPTC datasets, keyed as `record << 8 | dataset`
pub mod iptc {
    pub const fn key(record: u8, dataset: u8) -> u16 {
        (record as u16) << 8 | dataset as u16
    }

    pub const CODED_CHARACTER_SET: u16 = key(1, 90);
    pub const BY_LINE: u16 = key(2, 80);
    pub const BY_LINE_TITLE: u16 = key(2, 85);
    pub const HEADLINE: u16 = key(2, 105);
    pub const CAPTION: u16 = key(2, 120);
}
