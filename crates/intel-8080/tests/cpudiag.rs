//! Minimal CP/M harness for the classic 8080 diagnostics.
//!
//! CP/M memory layout:
//! - 0x0000: Warm boot (we put HLT here to signal exit)
//! - 0x0005: BDOS entry (we intercept CALL 5)
//! - 0x0006-0x0007: Top of TPA (programs read this for stack init)
//! - 0x0100: Program load address (TPA start)
//!
//! The `.COM` files are not distributed with the crate. Drop them into
//! `tests/data/` and run with `cargo test -- --ignored`.

use std::io::Write;

use emu_core::{Cpu, SimpleIo, StepOutcome};
use intel_8080::I8080;

const TPA: usize = 0x0100;

fn run_cpm(binary: &[u8]) -> String {
    let mut image = vec![0; TPA];
    image[0x0000] = 0x76; // HLT
    image[0x0005] = 0xC9; // RET
    image[0x0006] = 0x00; // Top of TPA = 0xFE00
    image[0x0007] = 0xFE;
    image.extend_from_slice(binary);

    let mut cpu = I8080::new(&image).expect("image fits in memory");
    let mut io = SimpleIo::new();
    cpu.set_pc(0x0100);

    let mut output = String::new();
    let mut instructions: u64 = 0;

    loop {
        let pc = cpu.pc();

        // BDOS intercept at 0x0005
        if pc == 0x0005 {
            match cpu.c() {
                2 => {
                    // Print character in E
                    output.push(cpu.e() as char);
                    eprint!("{}", cpu.e() as char);
                }
                9 => {
                    // Print string at DE until '$'
                    let mut addr = cpu.de();
                    loop {
                        let ch = cpu.memory().read(addr);
                        if ch == b'$' {
                            break;
                        }
                        output.push(ch as char);
                        eprint!("{}", ch as char);
                        addr = addr.wrapping_add(1);
                    }
                }
                func => eprintln!("\nUnknown BDOS function: {func}"),
            }
            std::io::stderr().flush().ok();
            cpu.force_ret();
            continue;
        }

        match cpu.step(&mut io) {
            Ok(StepOutcome::Continue) => instructions += 1,
            Ok(StepOutcome::Halted) => break,
            Err(e) => panic!("{e}\n{}", cpu.snapshot()),
        }

        if instructions % 100_000_000 == 0 && instructions > 0 {
            eprintln!("[{instructions} instructions]");
        }
    }

    eprintln!("\nTotal: {instructions} instructions, {} cycles", cpu.total_cycles());
    output
}

fn load(name: &str) -> Vec<u8> {
    let path = format!("tests/data/{name}");
    std::fs::read(&path).unwrap_or_else(|_| panic!("{path} not found"))
}

#[test]
#[ignore]
fn tst8080() {
    let output = run_cpm(&load("TST8080.COM"));
    assert!(output.contains("CPU IS OPERATIONAL"), "{output}");
}

#[test]
#[ignore]
fn preliminary() {
    let output = run_cpm(&load("8080PRE.COM"));
    assert!(output.contains("Preliminary tests complete"), "{output}");
}

#[test]
#[ignore]
fn cputest() {
    let output = run_cpm(&load("CPUTEST.COM"));
    assert!(output.contains("CPU TESTS OK"), "{output}");
}

#[test]
#[ignore]
fn exerciser() {
    let output = run_cpm(&load("8080EXM.COM"));
    assert!(!output.contains("ERROR"), "{output}");
}

/// The harness itself, on a tiny hand-assembled program.
#[test]
fn bdos_print_string() {
    let mut binary = vec![
        0x31, 0x00, 0xFE, // LXI SP,FE00
        0x0E, 0x09, // MVI C,09
        0x11, 0x00, 0x00, // LXI D,<string>
        0xCD, 0x05, 0x00, // CALL 0005
        0x0E, 0x02, // MVI C,02
        0x1E, 0x21, // MVI E,'!'
        0xCD, 0x05, 0x00, // CALL 0005
        0xC3, 0x00, 0x00, // JMP 0000
    ];
    let string_at = (TPA + binary.len()) as u16;
    binary[6] = string_at as u8;
    binary[7] = (string_at >> 8) as u8;
    binary.extend_from_slice(b"OK$");

    assert_eq!(run_cpm(&binary), "OK!");
}
