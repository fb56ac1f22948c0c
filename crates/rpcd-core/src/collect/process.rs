//! Process snapshot via busybox `top` in batch mode.
//!
//! busybox prints a fixed-layout table after a few summary lines:
//!
//! ```text
//! Mem: 27704K used, 32328K free, 0K shrd, 2256K buff, 10560K cached
//! CPU:   0% usr   9% sys   0% nic  90% idle   0% io   0% irq   0% sirq
//! Load average: 0.00 0.01 0.05 2/42 2045
//!   PID  PPID USER     STAT   VSZ %VSZ %CPU COMMAND
//!  2045  2044 root     R     1496   1%   9% top -bn1
//!   878     1 root     S <   1060   1%   0% /sbin/ubusd
//! ```
//!
//! STAT is a three character column that may itself contain blanks
//! (`S <`), so it is sliced by position rather than tokenized.

use super::command;
use super::fields::{leading_u32, leading_uint, Fields};
use rpcd_common::Result;
use rpcd_config::Commands;
use serde::Serialize;
use tracing::{debug, trace};

/// One row of the process table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub ppid: u32,
    pub user: String,
    /// Always exactly three characters, space padded.
    pub stat: String,
    /// Virtual size in bytes.
    pub vsize: u64,
    pub vsize_percent: u32,
    pub cpu_percent: u32,
    pub command: String,
}

const STAT_WIDTH: usize = 3;

/// Parse one line of `top -bn1` output.
///
/// Returns `None` for summary and header lines and for rows missing any
/// column.
pub fn parse_top_line(line: &str) -> Option<ProcessRecord> {
    let head = Fields::split(line, &[' ']);
    let pid = head.get(0)?;
    if !pid.as_bytes().first()?.is_ascii_digit() {
        return None;
    }
    let ppid = head.get(1)?;
    let user = head.get(2)?;
    let stat_offset = head.offset(3)?;

    let bytes = line.as_bytes();
    let mut stat = [b' '; STAT_WIDTH];
    for (i, slot) in stat.iter_mut().enumerate() {
        match bytes.get(stat_offset + i) {
            Some(b'\n') | Some(b'\r') | None => {}
            Some(&b) => *slot = b,
        }
    }

    let rest = bytes.get(stat_offset + STAT_WIDTH + 1..)?;
    let rest = String::from_utf8_lossy(rest);
    let tail = Fields::split(&rest, &[' ']);
    let vsz = tail.get(0)?;
    let pvsz = tail.get(1)?;
    let pcpu = tail.get(2)?;
    let command = rest[tail.end(2)?..]
        .trim_start()
        .trim_end_matches(['\n', '\r']);
    if command.is_empty() {
        return None;
    }

    Some(ProcessRecord {
        pid: leading_u32(pid),
        ppid: leading_u32(ppid),
        user: user.to_string(),
        stat: String::from_utf8_lossy(&stat).into_owned(),
        vsize: leading_uint(vsz).saturating_mul(1024),
        vsize_percent: leading_u32(pvsz),
        cpu_percent: leading_u32(pcpu),
        command: command.to_string(),
    })
}

/// Parse complete `top` output, skipping everything that is not a process row.
pub fn parse_top_output(output: &str) -> Vec<ProcessRecord> {
    output
        .lines()
        .enumerate()
        .filter_map(|(line_num, line)| {
            let record = parse_top_line(line);
            if record.is_none() {
                trace!(line_num, "skipping non-process line");
            }
            record
        })
        .collect()
}

/// Snapshot the running processes.
pub fn list_processes(commands: &Commands) -> Result<Vec<ProcessRecord>> {
    let output = command::capture_stdout(&commands.top)?;
    let records = parse_top_output(&output);
    debug!(count = records.len(), "process snapshot parsed");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Mem: 27704K used, 32328K free, 0K shrd, 2256K buff, 10560K cached
CPU:   0% usr   9% sys   0% nic  90% idle   0% io   0% irq   0% sirq
Load average: 0.00 0.01 0.05 2/42 2045
  PID  PPID USER     STAT   VSZ %VSZ %CPU COMMAND
 2045  2044 root     R     1496   1%   9% top -bn1
  878     1 root     S <   1060   1%   0% /sbin/ubusd
    1     0 root     S     1380   2%   0% /sbin/procd
";

    #[test]
    fn test_parse_running_row() {
        let record = parse_top_line(" 2045  2044 root     R     1496   1%   9% top -bn1\n").unwrap();
        assert_eq!(
            record,
            ProcessRecord {
                pid: 2045,
                ppid: 2044,
                user: "root".to_string(),
                stat: "R  ".to_string(),
                vsize: 1496 * 1024,
                vsize_percent: 1,
                cpu_percent: 9,
                command: "top -bn1".to_string(),
            }
        );
    }

    #[test]
    fn test_stat_with_embedded_blank() {
        let record = parse_top_line("  878     1 root     S <   1060   1%   0% /sbin/ubusd").unwrap();
        assert_eq!(record.stat, "S <");
        assert_eq!(record.vsize, 1060 * 1024);
        assert_eq!(record.command, "/sbin/ubusd");
    }

    #[test]
    fn test_headers_and_summary_skipped() {
        let records = parse_top_output(SAMPLE);
        assert_eq!(records.len(), 3);
        assert_eq!(
            records.iter().map(|r| r.pid).collect::<Vec<_>>(),
            vec![2045, 878, 1]
        );
    }

    #[test]
    fn test_non_numeric_first_token_excluded() {
        assert!(parse_top_line("root 1 2 S 100 1% 0% init").is_none());
        assert!(parse_top_line("").is_none());
    }

    #[test]
    fn test_truncated_rows_skipped() {
        assert!(parse_top_line("  12     1 root").is_none());
        assert!(parse_top_line("  12     1 root     S     100   1%").is_none());
        assert!(parse_top_line("  12     1 root     S     100   1%   0%   ").is_none());
    }

    #[test]
    fn test_command_keeps_inner_spacing() {
        let record =
            parse_top_line("  900     1 nobody   SN    2000   3%   1% /usr/sbin/dnsmasq -C  /var/etc/dnsmasq.conf")
                .unwrap();
        assert_eq!(record.user, "nobody");
        assert_eq!(record.stat, "SN ");
        assert_eq!(record.command, "/usr/sbin/dnsmasq -C  /var/etc/dnsmasq.conf");
    }

    #[test]
    fn test_list_processes_from_command() {
        let commands = Commands {
            top: vec!["printf".to_string(), SAMPLE.replace('%', "%%")],
            ..Commands::default()
        };
        let records = list_processes(&commands).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].command, "/sbin/procd");
    }
}
