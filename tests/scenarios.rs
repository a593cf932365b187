use ptsim::io::{parse_commands, run_commands};
use ptsim::{AllocationPurpose, MemoryError, PTP_OFFSET, Validation, VmManager};

fn run(vm: &mut VmManager, args: &[&str]) -> String {
    let commands = parse_commands(args).unwrap();
    let mut out = Vec::new();
    run_commands(&mut out, vm, &commands).unwrap();
    String::from_utf8(out).unwrap()
}

fn free_map_text(allocated: usize) -> String {
    let cells: Vec<char> = (0..PTP_OFFSET)
        .map(|i| if i < allocated { '#' } else { '.' })
        .collect();
    let mut text = String::from("--- PAGE FREE MAP ---\n");
    for row in cells.chunks(16) {
        text.extend(row);
        text.push('\n');
    }
    text
}

#[test]
fn create_store_load_kill() {
    let mut vm = VmManager::default();
    let out = run(
        &mut vm,
        &["np", "0", "2", "pfm", "sb", "0", "0", "42", "lb", "0", "0", "kp", "0", "pfm"],
    );

    let expected = format!(
        "{}Store proc 0: 0 => 512, value=42\nLoad proc 0: 0 => 512, value=42\n{}",
        free_map_text(4),
        free_map_text(1)
    );
    assert_eq!(out, expected);
}

#[test]
fn exhaustion_leaves_partial_process() {
    let mut vm = VmManager::default();
    let out = run(&mut vm, &["np", "0", "64", "ppt", "0"]);

    let mut expected = String::from("OOM: proc 0: data page\n--- PROCESS 0 PAGE TABLE ---\n");
    for vpage in 0..62 {
        expected.push_str(&format!("{:02x} -> {:02x}\n", vpage, vpage + 2));
    }
    assert_eq!(out, expected);
    assert_eq!(vm.page_table_of(0), Some(1));

    // Memory is still usable afterwards
    assert_eq!(
        run(&mut vm, &["sb", "0", "15000", "7", "lb", "0", "15000"]),
        "Store proc 0: 15000 => 15512, value=7\nLoad proc 0: 15000 => 15512, value=7\n"
    );
    vm.kill_process(0).unwrap();
    assert_eq!(vm.allocated_pages(), 1);
}

#[test]
fn allocated_count_tracks_live_processes() {
    let mut vm = VmManager::default();
    let sizes = [(0, 3), (1, 0), (2, 5), (3, 1)];
    for &(p, n) in &sizes {
        vm.new_process(p, n).unwrap();
    }
    let expected: usize = 1 + sizes.iter().map(|&(_, n)| 1 + n).sum::<usize>();
    assert_eq!(vm.allocated_pages(), expected);

    vm.kill_process(2).unwrap();
    assert_eq!(vm.allocated_pages(), expected - 6);

    vm.new_process(4, 2).unwrap();
    vm.kill_process(0).unwrap();
    assert_eq!(vm.allocated_pages(), expected - 6 + 3 - 4);
}

#[test]
fn stores_round_trip_across_all_mapped_pages() {
    let mut vm = VmManager::new(Validation::Strict);
    vm.new_process(5, 4).unwrap();
    for vaddr in (0..4 * 256).step_by(37) {
        let value = (vaddr % 251) as u8;
        vm.store(5, vaddr, value).unwrap();
        assert_eq!(vm.load(5, vaddr).unwrap().value, value);
    }
}

#[test]
fn processes_do_not_see_each_other() {
    let mut vm = VmManager::default();
    vm.new_process(0, 2).unwrap();
    vm.new_process(1, 2).unwrap();

    vm.store(0, 300, 1).unwrap();
    vm.store(1, 300, 2).unwrap();
    assert_eq!(vm.load(0, 300).unwrap().value, 1);
    assert_eq!(vm.load(1, 300).unwrap().value, 2);
}

#[test]
fn recreated_process_starts_clean() {
    let mut vm = VmManager::default();
    vm.new_process(0, 3).unwrap();
    vm.store(0, 0, 200).unwrap();
    vm.kill_process(0).unwrap();

    vm.new_process(0, 1).unwrap();
    assert_eq!(vm.mappings(0).unwrap(), vec![(0, 2)]);
    assert_eq!(vm.load(0, 0).unwrap().value, 0);
}

#[test]
fn page_table_exhaustion_reports_purpose() {
    let mut vm = VmManager::default();
    let _ = vm.new_process(0, 64);
    assert_eq!(
        vm.new_process(1, 1),
        Err(MemoryError::OutOfMemory {
            proc_num: 1,
            purpose: AllocationPurpose::PageTable
        })
    );
    assert_eq!(vm.page_table_of(1), None);
}

#[test]
fn killing_unknown_process_keeps_bitmap_intact() {
    let mut vm = VmManager::default();
    let out = run(&mut vm, &["np", "0", "1", "kp", "7", "kp", "7", "pfm"]);
    assert_eq!(out, free_map_text(3));
    assert!(vm.is_allocated(0));
}

#[test]
fn stray_store_into_map_does_not_free_page_zero() {
    let mut vm = VmManager::default();
    // Virtual page 1 is unmapped, so the store lands on page 0's map byte
    let out = run(&mut vm, &["np", "0", "1", "sb", "0", "256", "0", "np", "1", "1", "pfm"]);

    assert_eq!(
        out,
        format!("Store proc 0: 256 => 0, value=0\n{}", free_map_text(5))
    );
    assert!(vm.is_allocated(0));
    assert_eq!(vm.page_table_of(0), Some(1));
    assert_eq!(vm.page_table_of(1), Some(3));
    assert_eq!(vm.mappings(0).unwrap(), vec![(0, 2)]);
}
