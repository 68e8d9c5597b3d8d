//! Goodix GT9xx capacitive touch controller (GT9147, GT911)
//!
//! # Register map
//!
//! The controller sits at 7-bit address 0x14 with a 16-bit big-endian
//! register space:
//!
//! - `0x8040` command: 0x02 soft reset, 0x00 resume reporting
//! - `0x8047` configuration version
//! - `0x8140` product id, 4 ASCII bytes ("9147", "911\0")
//! - `0x814E` status: bit 7 data ready, bits 3:0 contact count
//! - `0x8150 + 8*i` point record `i`: x, y, size as little-endian u16
//!
//! After a report has been read the status register must be written back
//! to zero, or the controller stops updating it.
//!
//! # Bring-up
//!
//! Pulse the reset line low, read and check the product id, then issue a
//! soft reset. The sensor refreshes roughly every 10 ms; scanning faster
//! than that just returns "not ready".

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, OutputPin};
use tessera_core::{PanelDescriptor, Rotation, TouchKind};
use tessera_hal::RegisterBus;

use super::{TouchError, TouchPoint, MAX_TOUCH_POINTS};

/// GT9xx register addresses
pub mod reg {
    /// Command register
    pub const COMMAND: u16 = 0x8040;
    /// Configuration version
    pub const CONFIG_VERSION: u16 = 0x8047;
    /// Product id (4 bytes)
    pub const PRODUCT_ID: u16 = 0x8140;
    /// Touch status
    pub const STATUS: u16 = 0x814E;
    /// First point record
    pub const POINT_BASE: u16 = 0x8150;
    /// Distance between point records
    pub const POINT_STRIDE: u16 = 8;
}

/// Default 7-bit bus address
pub const DEFAULT_ADDRESS: u8 = 0x14;

const STATUS_READY: u8 = 0x80;
const STATUS_COUNT_MASK: u8 = 0x0F;
const CMD_SOFT_RESET: u8 = 0x02;
const CMD_RUN: u8 = 0x00;

/// Expected product id for a controller kind, or `None` if this driver
/// does not handle it
pub fn product_id(kind: TouchKind) -> Option<[u8; 4]> {
    match kind {
        TouchKind::Gt9147 => Some(*b"9147"),
        TouchKind::Gt911 => Some(*b"911\0"),
        TouchKind::Ft5206 => None,
    }
}

/// GT9xx driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gt9xxConfig {
    /// 7-bit bus address
    pub address: u8,
    /// Reset line held low for this long (ms)
    pub reset_hold_ms: u32,
    /// Settle time after releasing reset, before the first bus access (ms)
    pub reset_settle_ms: u32,
    /// Delay between the soft reset and resume commands (ms)
    pub soft_reset_delay_ms: u32,
}

impl Default for Gt9xxConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            reset_hold_ms: 10,
            reset_settle_ms: 100,
            soft_reset_delay_ms: 10,
        }
    }
}

/// GT9xx touch controller on a register bus
pub struct Gt9xx<I, R> {
    bus: I,
    reset: R,
    config: Gt9xxConfig,
    /// Physical panel size, known once init succeeded
    panel: Option<(u16, u16)>,
    product_id: [u8; 4],
}

impl<I, R> Gt9xx<I, R>
where
    I: RegisterBus,
    R: OutputPin,
{
    pub fn new(bus: I, reset: R, config: Gt9xxConfig) -> Self {
        Self {
            bus,
            reset,
            config,
            panel: None,
            product_id: [0; 4],
        }
    }

    pub fn config(&self) -> &Gt9xxConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.panel.is_some()
    }

    /// Product id read during the last successful init
    pub fn product_id(&self) -> Option<[u8; 4]> {
        self.panel.map(|_| self.product_id)
    }

    /// Give back the bus and reset pin
    pub fn release(self) -> (I, R) {
        (self.bus, self.reset)
    }

    /// Reset and identify the controller fitted to `panel`
    ///
    /// Can be called again after a failure; no retries happen here.
    pub fn init<D: DelayNs>(&mut self, panel: &PanelDescriptor, delay: &mut D) -> Result<(), TouchError<I::Error>> {
        self.panel = None;
        let Some(expected) = product_id(panel.touch) else {
            warn!("Touch controller not supported by GT9xx driver");
            return Err(TouchError::Unsupported);
        };

        self.reset.set_low().map_err(|e| TouchError::Reset(e.kind()))?;
        delay.delay_ms(self.config.reset_hold_ms);
        self.reset.set_high().map_err(|e| TouchError::Reset(e.kind()))?;
        delay.delay_ms(self.config.reset_settle_ms);

        let mut id = [0u8; 4];
        self.bus
            .read_register(self.config.address, reg::PRODUCT_ID, &mut id)
            .map_err(TouchError::Bus)?;
        if id != expected {
            error!("Touch product id mismatch: {=[u8]:a}", &id[..]);
            return Err(TouchError::IdentityMismatch(id));
        }

        self.write(reg::COMMAND, CMD_SOFT_RESET)?;
        delay.delay_ms(self.config.soft_reset_delay_ms);
        self.write(reg::COMMAND, CMD_RUN)?;

        self.product_id = id;
        self.panel = Some((panel.width, panel.height));
        info!("Touch controller GT{=[u8]:a} ready", &id[..]);
        Ok(())
    }

    /// Read the configuration version byte
    pub fn config_version(&mut self) -> Result<u8, TouchError<I::Error>> {
        self.bus
            .read_register_byte(self.config.address, reg::CONFIG_VERSION)
            .map_err(TouchError::Bus)
    }

    /// Read up to `max_count` contacts into `points`
    ///
    /// Returns the number of points written, 0 if no new report is ready.
    /// Points are mapped into logical coordinates for `rotation`. Only
    /// `points[..n]` is written.
    pub fn scan(
        &mut self,
        rotation: Rotation,
        points: &mut [TouchPoint],
        max_count: usize,
    ) -> Result<usize, TouchError<I::Error>> {
        let (panel_w, panel_h) = self.panel.ok_or(TouchError::NotInitialized)?;
        if max_count == 0 || max_count > MAX_TOUCH_POINTS || max_count > points.len() {
            return Err(TouchError::InvalidParameter);
        }

        let status = self
            .bus
            .read_register_byte(self.config.address, reg::STATUS)
            .map_err(TouchError::Bus)?;
        if status & STATUS_READY == 0 {
            return Ok(0);
        }

        let count = ((status & STATUS_COUNT_MASK) as usize).min(max_count);
        for (i, point) in points[..count].iter_mut().enumerate() {
            let mut record = [0u8; 6];
            let register = reg::POINT_BASE + reg::POINT_STRIDE * i as u16;
            self.bus
                .read_register(self.config.address, register, &mut record)
                .map_err(TouchError::Bus)?;

            // Clamp sensor noise at the edges before mapping
            let raw_x = u16::from_le_bytes([record[0], record[1]]).min(panel_w - 1);
            let raw_y = u16::from_le_bytes([record[2], record[3]]).min(panel_h - 1);
            let (x, y) = rotation.to_logical(raw_x, raw_y, panel_w, panel_h);
            *point = TouchPoint {
                x,
                y,
                size: u16::from_le_bytes([record[4], record[5]]),
            };
        }

        self.write(reg::STATUS, 0)?;
        trace!("Touch scan: {} points", count);
        Ok(count)
    }

    fn write(&mut self, register: u16, value: u8) -> Result<(), TouchError<I::Error>> {
        self.bus
            .write_register_byte(self.config.address, register, value)
            .map_err(TouchError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDelay, MockPin, RegisterMap};
    use tessera_core::panel::lookup;

    fn gt9147() -> RegisterMap {
        let mut map = RegisterMap::new(DEFAULT_ADDRESS);
        map.load(reg::PRODUCT_ID, b"9147");
        map.load(reg::CONFIG_VERSION, &[0x41]);
        map
    }

    fn ready_driver(map: RegisterMap) -> Gt9xx<RegisterMap, MockPin> {
        let mut touch = Gt9xx::new(map, MockPin::new(), Gt9xxConfig::default());
        touch.init(lookup(0).unwrap(), &mut MockDelay::new()).unwrap();
        touch
    }

    fn report(map: &mut RegisterMap, points: &[(u16, u16, u16)]) {
        map.load(reg::STATUS, &[STATUS_READY | points.len() as u8]);
        for (i, &(x, y, size)) in points.iter().enumerate() {
            let mut record = [0u8; 6];
            record[..2].copy_from_slice(&x.to_le_bytes());
            record[2..4].copy_from_slice(&y.to_le_bytes());
            record[4..].copy_from_slice(&size.to_le_bytes());
            map.load(reg::POINT_BASE + 8 * i as u16, &record);
        }
    }

    #[test]
    fn test_init_sequence() {
        let mut delay = MockDelay::new();
        let mut touch = Gt9xx::new(gt9147(), MockPin::new(), Gt9xxConfig::default());

        touch.init(lookup(0).unwrap(), &mut delay).unwrap();
        assert!(touch.is_initialized());
        assert_eq!(touch.product_id(), Some(*b"9147"));

        let (map, pin) = touch.release();
        // Reset pulse: low then high
        assert_eq!(pin.history.as_slice(), &[false, true]);
        // Soft reset then resume
        assert_eq!(map.writes.as_slice(), &[(reg::COMMAND, CMD_SOFT_RESET), (reg::COMMAND, CMD_RUN)]);
        assert_eq!(delay.total_ms(), 10 + 100 + 10);
    }

    #[test]
    fn test_init_gt911_identity() {
        let mut map = RegisterMap::new(DEFAULT_ADDRESS);
        map.load(reg::PRODUCT_ID, b"911\0");
        let mut touch = Gt9xx::new(map, MockPin::new(), Gt9xxConfig::default());

        // Strap 2 carries a GT911
        touch.init(lookup(2).unwrap(), &mut MockDelay::new()).unwrap();
        assert_eq!(touch.product_id(), Some(*b"911\0"));
    }

    #[test]
    fn test_init_identity_mismatch() {
        let mut map = RegisterMap::new(DEFAULT_ADDRESS);
        map.load(reg::PRODUCT_ID, b"911\0");
        let mut touch = Gt9xx::new(map, MockPin::new(), Gt9xxConfig::default());

        let result = touch.init(lookup(0).unwrap(), &mut MockDelay::new());
        assert_eq!(result, Err(TouchError::IdentityMismatch(*b"911\0")));
        assert!(!touch.is_initialized());

        // No soft reset issued to an unknown device
        let (map, _) = touch.release();
        assert!(map.writes.is_empty());
    }

    #[test]
    fn test_init_unsupported_kind_touches_nothing() {
        let mut touch = Gt9xx::new(gt9147(), MockPin::new(), Gt9xxConfig::default());

        // Strap 1 carries an FT5206
        let result = touch.init(lookup(1).unwrap(), &mut MockDelay::new());
        assert_eq!(result, Err(TouchError::Unsupported));

        let (map, pin) = touch.release();
        assert!(pin.history.is_empty());
        assert_eq!(map.transactions, 0);
    }

    #[test]
    fn test_init_bus_failure_propagates() {
        let mut map = gt9147();
        map.nack = true;
        let mut touch = Gt9xx::new(map, MockPin::new(), Gt9xxConfig::default());

        let result = touch.init(lookup(0).unwrap(), &mut MockDelay::new());
        assert!(matches!(result, Err(TouchError::Bus(_))));
    }

    #[test]
    fn test_config_version() {
        let mut touch = ready_driver(gt9147());
        assert_eq!(touch.config_version(), Ok(0x41));
    }

    #[test]
    fn test_scan_before_init() {
        let mut touch = Gt9xx::new(gt9147(), MockPin::new(), Gt9xxConfig::default());
        let mut points = [TouchPoint::default(); 5];
        assert_eq!(touch.scan(Rotation::Deg0, &mut points, 5), Err(TouchError::NotInitialized));
    }

    #[test]
    fn test_scan_not_ready_returns_zero() {
        let mut touch = ready_driver(gt9147());
        let sentinel = TouchPoint { x: 7, y: 7, size: 7 };
        let mut points = [sentinel; 5];

        assert_eq!(touch.scan(Rotation::Deg0, &mut points, 5), Ok(0));
        assert!(points.iter().all(|p| *p == sentinel));

        // No acknowledge written when nothing was ready
        let (map, _) = touch.release();
        assert_eq!(map.writes.len(), 2);
    }

    #[test]
    fn test_scan_reads_and_acknowledges() {
        let mut map = gt9147();
        report(&mut map, &[(100, 50, 12), (479, 271, 3)]);
        let mut touch = ready_driver(map);
        let mut points = [TouchPoint::default(); 5];

        assert_eq!(touch.scan(Rotation::Deg0, &mut points, 5), Ok(2));
        assert_eq!(points[0], TouchPoint { x: 100, y: 50, size: 12 });
        assert_eq!(points[1], TouchPoint { x: 479, y: 271, size: 3 });
        assert_eq!(points[2], TouchPoint::default());

        let (map, _) = touch.release();
        assert_eq!(map.writes.last(), Some(&(reg::STATUS, 0)));
        assert_eq!(map.get(reg::STATUS), 0);
    }

    #[test]
    fn test_scan_limits_to_max_count() {
        let mut map = gt9147();
        report(&mut map, &[(1, 1, 1), (2, 2, 2), (3, 3, 3)]);
        let mut touch = ready_driver(map);
        let sentinel = TouchPoint { x: 9, y: 9, size: 9 };
        let mut points = [sentinel; 2];

        assert_eq!(touch.scan(Rotation::Deg0, &mut points, 1), Ok(1));
        assert_eq!(points[0].x, 1);
        assert_eq!(points[1], sentinel);
    }

    #[test]
    fn test_scan_rejects_bad_counts() {
        let mut touch = ready_driver(gt9147());
        let mut points = [TouchPoint::default(); 8];

        assert_eq!(touch.scan(Rotation::Deg0, &mut points, 0), Err(TouchError::InvalidParameter));
        assert_eq!(touch.scan(Rotation::Deg0, &mut points, 6), Err(TouchError::InvalidParameter));
        assert_eq!(touch.scan(Rotation::Deg0, &mut points[..2], 3), Err(TouchError::InvalidParameter));
    }

    #[test]
    fn test_scan_remaps_through_rotation() {
        let mut map = gt9147();
        // Physical top-right corner of the 480x272 panel
        report(&mut map, &[(479, 0, 1)]);
        let mut touch = ready_driver(map);
        let mut points = [TouchPoint::default(); 1];

        // At 90 degrees logical (0, 0) maps to physical (479, 0)
        assert_eq!(touch.scan(Rotation::Deg90, &mut points, 1), Ok(1));
        assert_eq!((points[0].x, points[0].y), (0, 0));
        assert_eq!(
            Rotation::Deg90.to_physical(points[0].x, points[0].y, 480, 272),
            (479, 0)
        );
    }

    #[test]
    fn test_scan_clamps_out_of_range_reports() {
        let mut map = gt9147();
        report(&mut map, &[(600, 300, 1)]);
        let mut touch = ready_driver(map);
        let mut points = [TouchPoint::default(); 1];

        assert_eq!(touch.scan(Rotation::Deg180, &mut points, 1), Ok(1));
        assert_eq!((points[0].x, points[0].y), (0, 0));
    }

    proptest::proptest! {
        #[test]
        fn prop_scan_inverts_draw_transform(
            x in 0u16..480,
            y in 0u16..272,
            index in 0u8..4,
        ) {
            let rotation = Rotation::from_index(index).unwrap();
            let mut map = gt9147();
            report(&mut map, &[(x, y, 1)]);
            let mut touch = ready_driver(map);
            let mut points = [TouchPoint::default(); 1];

            proptest::prop_assert_eq!(touch.scan(rotation, &mut points, 1), Ok(1));
            let (w, h) = rotation.logical_size(480, 272);
            proptest::prop_assert!(points[0].x < w && points[0].y < h);
            proptest::prop_assert_eq!(rotation.to_physical(points[0].x, points[0].y, 480, 272), (x, y));
        }
    }
}
