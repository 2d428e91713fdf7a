#![no_std]

//! Small hand-assembled 68000 ROM images. Every image starts with the two
//! reset vectors (initial sp, initial pc) and places its code at 0x000008.

/// Two NOPs and nothing after them: the third fetch runs off the image.
///
/// ```text
/// 000008  nop
/// 00000A  nop
/// ```
pub static TWO_NOPS: &[u8] = &[
    0x00, 0xFF, 0x00, 0xFE, // sp = $00ff00fe
    0x00, 0x00, 0x00, 0x08, // pc = $00000008
    0x4E, 0x71, //
    0x4E, 0x71, //
];

/// DBF loop: the body runs five times, decrementing d1 each pass.
///
/// ```text
/// 000008  move.l #$4,d0
/// 00000E  subq.l #1,d1
/// 000010  dbf d0,$00000e
/// 000014  stop #$2700
/// ```
pub static COUNTDOWN: &[u8] = &[
    0x00, 0xFF, 0xFE, 0x00, // sp = $00fffe00
    0x00, 0x00, 0x00, 0x08, // pc = $00000008
    0x20, 0x3C, 0x00, 0x00, 0x00, 0x04, //
    0x53, 0x81, //
    0x51, 0xC8, 0xFF, 0xFC, //
    0x4E, 0x72, 0x27, 0x00, //
];

/// Subroutine call through the stack.
///
/// ```text
/// 000008  bsr.s $000010
/// 00000A  stop #$2700
/// 00000E  nop
/// 000010  move.l #$2a,d0
/// 000016  rts
/// ```
pub static CALL: &[u8] = &[
    0x00, 0xFF, 0xFE, 0x00, // sp = $00fffe00
    0x00, 0x00, 0x00, 0x08, // pc = $00000008
    0x61, 0x06, //
    0x4E, 0x72, 0x27, 0x00, //
    0x4E, 0x71, //
    0x20, 0x3C, 0x00, 0x00, 0x00, 0x2A, //
    0x4E, 0x75, //
];

/// Stores through an address register into work RAM.
///
/// ```text
/// 000008  lea $00ff0000,a0
/// 00000E  move.l #$deadbeef,(a0)+
/// 000014  move.w #$1234,(a0)
/// 000018  tst.w (a0)
/// 00001A  beq.s $000020
/// 00001C  stop #$2700
/// 000020  stop #$2704
/// ```
pub static RAM_STORE: &[u8] = &[
    0x00, 0xFF, 0xFE, 0x00, // sp = $00fffe00
    0x00, 0x00, 0x00, 0x08, // pc = $00000008
    0x41, 0xF9, 0x00, 0xFF, 0x00, 0x00, //
    0x20, 0xFC, 0xDE, 0xAD, 0xBE, 0xEF, //
    0x30, 0xBC, 0x12, 0x34, //
    0x4A, 0x50, //
    0x67, 0x04, //
    0x4E, 0x72, 0x27, 0x00, //
    0x4E, 0x72, 0x27, 0x04, //
];

/// Console start-up: checks the expansion ports, then unlocks the VDP by
/// writing 'SEGA' to the TMSS latch unless the hardware version is 0.
///
/// ```text
/// 000008  tst.l $00a10008
/// 00000E  bne.s $000016
/// 000010  tst.w $00a1000c
/// 000016  lea 52(pc),a5
/// 00001A  move.b $00a10001,d0
/// 000020  andi.b #$f,d0
/// 000024  beq.s $000030
/// 000026  move.l #$53454741,$00a14000
/// 000030  stop #$2700
/// ```
pub static TMSS_BOOT: &[u8] = &[
    0x00, 0xFF, 0xFE, 0x00, // sp = $00fffe00
    0x00, 0x00, 0x00, 0x08, // pc = $00000008
    0x4A, 0xB9, 0x00, 0xA1, 0x00, 0x08, //
    0x66, 0x06, //
    0x4A, 0x79, 0x00, 0xA1, 0x00, 0x0C, //
    0x4B, 0xFA, 0x00, 0x34, //
    0x10, 0x39, 0x00, 0xA1, 0x00, 0x01, //
    0x02, 0x00, 0x00, 0x0F, //
    0x67, 0x0A, //
    0x23, 0xFC, 0x53, 0x45, 0x47, 0x41, 0x00, 0xA1, 0x40, 0x00, //
    0x4E, 0x72, 0x27, 0x00, //
];
