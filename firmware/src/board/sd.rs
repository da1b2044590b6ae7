//! SD/MMC card driver over SPI.
//!
//! `detect` runs the SPI-mode initialization dance and reads the capacity
//! out of the CSD. The byte-stream transport opens single-block commands
//! and clocks data across one byte per call, carrying the handshake phase
//! between calls; a command rejection, a missing data token, or a write
//! that the card refuses all collapse to [`StreamPhase::Failed`].

use gpt_disk_types::Lba;
use kestrel_core::{ByteStream, CardError, CardKind, StorageCard, StreamPhase, SECTOR_SIZE};

use super::spi::Spi;

const CMD0_GO_IDLE: u8 = 0;
const CMD1_SEND_OP_COND: u8 = 1;
const CMD8_SEND_IF_COND: u8 = 8;
const CMD9_SEND_CSD: u8 = 9;
const CMD17_READ_SINGLE_BLOCK: u8 = 17;
const CMD24_WRITE_BLOCK: u8 = 24;
const CMD55_APP_CMD: u8 = 55;
const CMD58_READ_OCR: u8 = 58;
const ACMD41_SD_SEND_OP_COND: u8 = 41;

const R1_IDLE: u8 = 0x01;
const R1_ILLEGAL_COMMAND: u8 = 0x04;
const TOKEN_START_BLOCK: u8 = 0xFE;
const DATA_RESPONSE_MASK: u8 = 0x1F;
const DATA_RESPONSE_ACCEPTED: u8 = 0x05;

const RESPONSE_ATTEMPTS: u32 = 1_000;
const INIT_ATTEMPTS: u32 = 10_000;
const TOKEN_ATTEMPTS: u32 = 100_000;
const BUSY_ATTEMPTS: u32 = 500_000;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Op {
    Idle,
    Read,
    Write,
}

pub struct SdCard {
    spi: Spi,
    high_capacity: bool,
    capacity_blocks: u64,
    phase: StreamPhase,
    op: Op,
}

impl SdCard {
    pub fn new(spi: Spi) -> Self {
        Self {
            spi,
            high_capacity: false,
            capacity_blocks: 0,
            phase: StreamPhase::Begin,
            op: Op::Idle,
        }
    }

    pub fn board() -> Self {
        Self::new(Spi::board())
    }

    fn clock_idle(&mut self, bytes: u32) {
        for _ in 0..bytes {
            self.spi.transfer(0xFF);
        }
    }

    /// Send one command frame and wait for the R1 response byte.
    fn command(&mut self, cmd: u8, arg: u32) -> u8 {
        self.spi.transfer(0xFF);
        self.spi.transfer(0x40 | cmd);
        for shift in [24, 16, 8, 0] {
            self.spi.transfer((arg >> shift) as u8);
        }
        // Only CMD0 and CMD8 need a live CRC; everything later runs with
        // CRC checking off.
        self.spi.transfer(match cmd {
            CMD0_GO_IDLE => 0x95,
            CMD8_SEND_IF_COND => 0x87,
            _ => 0x01,
        });
        for _ in 0..RESPONSE_ATTEMPTS {
            let r = self.spi.transfer(0xFF);
            if r & 0x80 == 0 {
                return r;
            }
        }
        0xFF
    }

    fn app_command(&mut self, cmd: u8, arg: u32) -> u8 {
        self.command(CMD55_APP_CMD, 0);
        self.command(cmd, arg)
    }

    /// Poll ACMD41 until the card leaves idle.
    fn wait_sd_ready(&mut self, host_capacity: bool) -> bool {
        let arg = if host_capacity { 1 << 30 } else { 0 };
        for _ in 0..INIT_ATTEMPTS {
            if self.app_command(ACMD41_SD_SEND_OP_COND, arg) == 0 {
                return true;
            }
        }
        false
    }

    /// Poll CMD1 until an MMC part leaves idle.
    fn wait_mmc_ready(&mut self) -> bool {
        for _ in 0..INIT_ATTEMPTS {
            if self.command(CMD1_SEND_OP_COND, 0) == 0 {
                return true;
            }
        }
        false
    }

    /// Capacity in 512-byte blocks from the CSD register.
    fn read_csd_capacity(&mut self) -> Option<u64> {
        if self.command(CMD9_SEND_CSD, 0) != 0 {
            return None;
        }
        let mut found = false;
        for _ in 0..TOKEN_ATTEMPTS {
            if self.spi.transfer(0xFF) == TOKEN_START_BLOCK {
                found = true;
                break;
            }
        }
        if !found {
            return None;
        }
        let mut csd = [0u8; 16];
        for byte in &mut csd {
            *byte = self.spi.transfer(0xFF);
        }
        self.spi.transfer(0xFF);
        self.spi.transfer(0xFF); // CRC trailer

        match csd[0] >> 6 {
            0 => {
                // CSD v1: blocks = (C_SIZE + 1) << (C_SIZE_MULT + 2),
                // scaled by the read block length.
                let read_bl_len = (csd[5] & 0x0F) as u32;
                let c_size = (((csd[6] & 0x03) as u32) << 10)
                    | ((csd[7] as u32) << 2)
                    | ((csd[8] as u32) >> 6);
                let c_size_mult = (((csd[9] & 0x03) as u32) << 1) | ((csd[10] as u32) >> 7);
                let blocks = (c_size as u64 + 1) << (c_size_mult + 2);
                Some((blocks << read_bl_len) >> 9)
            }
            1 => {
                // CSD v2: (C_SIZE + 1) * 512 KiB.
                let c_size = (((csd[7] & 0x3F) as u64) << 16)
                    | ((csd[8] as u64) << 8)
                    | (csd[9] as u64);
                Some((c_size + 1) * 1024)
            }
            _ => None,
        }
    }

    /// Abort the current operation and release the bus.
    fn fail(&mut self) -> StreamPhase {
        self.spi.select(false);
        self.op = Op::Idle;
        self.phase = StreamPhase::Failed;
        self.phase
    }

    fn block_address(&self, sector: Lba) -> u32 {
        if self.high_capacity {
            sector.0 as u32
        } else {
            sector.0 as u32 * SECTOR_SIZE as u32
        }
    }
}

impl StorageCard for SdCard {
    fn detect(&mut self) -> Result<CardKind, CardError> {
        // 74+ clocks with the card deselected wake the SPI interface.
        self.spi.select(false);
        self.clock_idle(10);
        self.spi.select(true);

        if self.command(CMD0_GO_IDLE, 0) != R1_IDLE {
            self.spi.select(false);
            return Err(CardError::NoCard);
        }

        let r1 = self.command(CMD8_SEND_IF_COND, 0x0000_01AA);
        let kind = if r1 == R1_IDLE {
            // v2 card: check the voltage echo, then poll with HCS set.
            let mut echo = [0u8; 4];
            for byte in &mut echo {
                *byte = self.spi.transfer(0xFF);
            }
            if echo[2] & 0x0F != 0x01 || echo[3] != 0xAA {
                self.spi.select(false);
                return Err(CardError::Unusable);
            }
            if !self.wait_sd_ready(true) {
                self.spi.select(false);
                return Err(CardError::InitTimeout);
            }
            if self.command(CMD58_READ_OCR, 0) != 0 {
                self.spi.select(false);
                return Err(CardError::Unusable);
            }
            let mut ocr = [0u8; 4];
            for byte in &mut ocr {
                *byte = self.spi.transfer(0xFF);
            }
            // The CCS bit separates SDHC from standard capacity.
            if ocr[0] & 0x40 != 0 {
                self.high_capacity = true;
                CardKind::Sdhc
            } else {
                CardKind::Sd
            }
        } else if r1 & R1_ILLEGAL_COMMAND != 0 {
            // v1 SD answers ACMD41; MMC parts only know CMD1.
            if self.wait_sd_ready(false) {
                CardKind::Sd
            } else if self.wait_mmc_ready() {
                CardKind::Mmc
            } else {
                self.spi.select(false);
                return Err(CardError::InitTimeout);
            }
        } else {
            self.spi.select(false);
            return Err(CardError::Unusable);
        };

        let capacity = match self.read_csd_capacity() {
            Some(blocks) => blocks,
            None => {
                self.spi.select(false);
                return Err(CardError::Unusable);
            }
        };
        self.spi.select(false);

        self.capacity_blocks = capacity;
        Ok(kind)
    }

    fn capacity_blocks(&mut self) -> u64 {
        self.capacity_blocks
    }
}

impl ByteStream for SdCard {
    fn begin_read(&mut self, sector: Lba) -> StreamPhase {
        self.phase = StreamPhase::Begin;
        let addr = self.block_address(sector);
        self.spi.select(true);
        if self.command(CMD17_READ_SINGLE_BLOCK, addr) != 0 {
            return self.fail();
        }
        for _ in 0..TOKEN_ATTEMPTS {
            if self.spi.transfer(0xFF) == TOKEN_START_BLOCK {
                self.op = Op::Read;
                self.phase = StreamPhase::InProgress(SECTOR_SIZE as u32);
                return self.phase;
            }
        }
        self.fail()
    }

    fn next_read_byte(&mut self) -> (u8, StreamPhase) {
        let remaining = match (self.op, self.phase) {
            (Op::Read, StreamPhase::InProgress(n)) => n,
            _ => return (0xFF, self.fail()),
        };
        let byte = self.spi.transfer(0xFF);
        self.phase = if remaining == 1 {
            // CRC trailer, then release the bus.
            self.spi.transfer(0xFF);
            self.spi.transfer(0xFF);
            self.spi.select(false);
            self.op = Op::Idle;
            StreamPhase::Complete
        } else {
            StreamPhase::InProgress(remaining - 1)
        };
        (byte, self.phase)
    }

    fn begin_write(&mut self, sector: Lba) -> StreamPhase {
        self.phase = StreamPhase::Begin;
        let addr = self.block_address(sector);
        self.spi.select(true);
        if self.command(CMD24_WRITE_BLOCK, addr) != 0 {
            return self.fail();
        }
        self.spi.transfer(0xFF);
        self.spi.transfer(TOKEN_START_BLOCK);
        self.op = Op::Write;
        self.phase = StreamPhase::InProgress(SECTOR_SIZE as u32);
        self.phase
    }

    fn next_write_byte(&mut self, byte: u8) -> StreamPhase {
        let remaining = match (self.op, self.phase) {
            (Op::Write, StreamPhase::InProgress(n)) => n,
            _ => return self.fail(),
        };
        self.spi.transfer(byte);
        if remaining > 1 {
            self.phase = StreamPhase::InProgress(remaining - 1);
            return self.phase;
        }

        // Dummy CRC, data response, then wait out programming.
        self.spi.transfer(0xFF);
        self.spi.transfer(0xFF);
        let response = self.spi.transfer(0xFF);
        if response & DATA_RESPONSE_MASK != DATA_RESPONSE_ACCEPTED {
            return self.fail();
        }
        let mut done = false;
        for _ in 0..BUSY_ATTEMPTS {
            if self.spi.transfer(0xFF) == 0xFF {
                done = true;
                break;
            }
        }
        if !done {
            return self.fail();
        }
        self.spi.select(false);
        self.op = Op::Idle;
        self.phase = StreamPhase::Complete;
        self.phase
    }
}
