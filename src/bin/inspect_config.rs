use anyhow::Context;
use sensorboard_cal::config::ConfigRecord;
use sensorboard_cal::types::Channel;

// Evaluates every calibration curve the same way the sensor service does,
// handy for eyeballing a freshly generated config.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let path = args.get(1).map(String::as_str).unwrap_or("config.toml");
    let readings: Vec<f64> = if args.len() > 2 {
        args[2..]
            .iter()
            .map(|a| a.parse::<f64>().with_context(|| format!("'{}' is not a number", a)))
            .collect::<anyhow::Result<_>>()?
    } else {
        vec![0.0, 256.0, 512.0, 1023.0]
    };

    let config = ConfigRecord::load(path).with_context(|| format!("Failed to load {}", path))?;
    println!("Site: {} ({})", config.influxdb.site_name, config.influxdb.endpoint);
    println!("Serial: {} @ {} baud", config.serial.port, config.serial.baud);

    print!("{:<14}", "Raw");
    for r in &readings {
        print!(" | {:>12}", r);
    }
    println!();
    println!("{}", "-".repeat(14 + 15 * readings.len()));

    for channel in Channel::ALL {
        let curve = config.calibration.curve(channel);
        print!("{:<14}", channel.key());
        for r in &readings {
            print!(" | {:>12.4}", curve.evaluate(*r));
        }
        println!();
    }

    Ok(())
}
