
use std::fs::File;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::{Arg, ArgMatches, Command};
use log::{error, info};

use wide_adpcm::{AdpcmState, decode_adpcm_to_vec, encode_adpcm_to_vec};

// one minute of 44.1 kHz audio
const DEFAULT_MAX_SAMPLES: usize = 44100 * 60;

fn main() -> ExitCode {
    pretty_env_logger::init();

    let args = Command::new("codec-tester")
        .about("Encodes and decodes 32-bit samples with wide-adpcm")
        .subcommand_required(true)
        .subcommand(
            Command::new("roundtrip")
                .about("Encodes and decodes a file of raw little-endian 32-bit samples")
                .arg(Arg::new("INPUT").help("The input file path").required(true).index(1))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_name("FILE")
                        .default_value("out.snd")
                        .help("The file the decoded samples are written to"),
                )
                .arg(
                    Arg::new("max-samples")
                        .long("max-samples")
                        .value_name("COUNT")
                        .help("The maximum number of samples read from the input"),
                )
                .arg(
                    Arg::new("dump")
                        .long("dump")
                        .value_name("COUNT")
                        .default_value("50")
                        .help("The number of encoded bytes and samples to print"),
                ),
        )
        .subcommand(
            Command::new("encode")
                .about("Encodes sample values and prints the encoded bytes")
                .arg(Arg::new("VALUES").required(true).multiple_values(true).allow_hyphen_values(true)),
        )
        .subcommand(
            Command::new("decode")
                .about("Decodes byte values and prints the decoded samples")
                .arg(Arg::new("VALUES").required(true).multiple_values(true)),
        )
        .get_matches();

    let result = match args.subcommand() {
        Some(("roundtrip", sub_args)) => roundtrip(sub_args),
        Some(("encode", sub_args)) => encode_values(sub_args),
        Some(("decode", sub_args)) => decode_values(sub_args),
        _ => Err(invalid_input("unknown command".to_string())),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn invalid_input(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn parse_count(args: &ArgMatches, name: &str, default: usize) -> io::Result<usize> {
    match args.value_of(name) {
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| invalid_input(format!("bad {} value: {}", name, value))),
        None => Ok(default),
    }
}

fn roundtrip(args: &ArgMatches) -> io::Result<()> {
    let input = args.value_of("INPUT").unwrap_or_default();
    let output = args.value_of("output").unwrap_or("out.snd");
    let max_samples = parse_count(args, "max-samples", DEFAULT_MAX_SAMPLES)?;
    let dump = parse_count(args, "dump", 50)?;

    let mut data = Vec::new();
    File::open(input)?.take(max_samples.saturating_mul(4) as u64).read_to_end(&mut data)?;
    let samples: Vec<i32> = data
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    info!("read {} samples from {}", samples.len(), input);

    let mut enc_state = AdpcmState::new();
    let encoded = encode_adpcm_to_vec(&samples, &mut enc_state);
    let mut dec_state = AdpcmState::new();
    let decoded = decode_adpcm_to_vec(&encoded, &mut dec_state, samples.len())
        .map_err(|err| invalid_input(err.to_string()))?;

    println!("samples: {}", samples.len());
    println!("encoded: {}",
        encoded.iter().take(dump).map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" "));
    println!("decoded: {}",
        decoded.iter().take(dump).map(|s| format!("{:08x}", s)).collect::<Vec<_>>().join(" "));
    println!("source:  {}",
        samples.iter().take(dump).map(|s| format!("{:08x}", s)).collect::<Vec<_>>().join(" "));

    let mut out = Vec::with_capacity(decoded.len() * 4);
    for s in &decoded {
        out.extend_from_slice(&s.to_le_bytes());
    }
    File::create(output)?.write_all(&out)?;
    info!("wrote {} decoded samples to {}", decoded.len(), output);
    Ok(())
}

fn encode_values(args: &ArgMatches) -> io::Result<()> {
    let samples = args
        .values_of("VALUES")
        .into_iter()
        .flatten()
        .map(|v| v.parse::<i32>().map_err(|_| invalid_input(format!("bad value: {}", v))))
        .collect::<io::Result<Vec<i32>>>()?;
    let mut state = AdpcmState::new();
    for b in encode_adpcm_to_vec(&samples, &mut state) {
        println!("{}", b);
    }
    Ok(())
}

fn decode_values(args: &ArgMatches) -> io::Result<()> {
    let bytes = args
        .values_of("VALUES")
        .into_iter()
        .flatten()
        .map(|v| v.parse::<u8>().map_err(|_| invalid_input(format!("bad value: {}", v))))
        .collect::<io::Result<Vec<u8>>>()?;
    let mut state = AdpcmState::new();
    let samples = decode_adpcm_to_vec(&bytes, &mut state, bytes.len() * 2)
        .map_err(|err| invalid_input(err.to_string()))?;
    for s in samples {
        println!("{}", s);
    }
    Ok(())
}
