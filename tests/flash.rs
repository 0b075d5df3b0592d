mod common;

mod tests {
    use crate::common::{Event, LineState, MockBoard, fast_config};
    use embassy_futures::join::join;
    use embassy_time::{Duration, Timer};
    use futures::executor::block_on;
    use myrtio_pin_effects::{
        Coordinator, EffectConfig, EffectError, FlashTarget, Level, Line, StopRequest,
    };

    fn high_writes(board: &MockBoard, line: Line) -> usize {
        board
            .events_for(line)
            .iter()
            .filter(|event| matches!(event, Event::Write(_, Level::High)))
            .count()
    }

    #[test]
    fn test_flash_odd_lines() {
        let board = MockBoard::new();
        let coordinator = Coordinator::new(board.driver(), fast_config()).unwrap();
        let lines = coordinator.config().lines.clone();

        block_on(coordinator.flash(2, &FlashTarget::Odd)).unwrap();

        for (i, line) in lines.iter().enumerate() {
            let expected = if i % 2 == 0 { 2 } else { 0 };
            assert_eq!(high_writes(&board, *line), expected, "line {line}");
        }
        assert!(board.all_low(&lines));
        assert!(!coordinator.is_active());
    }

    #[test]
    fn test_flash_even_lines() {
        let board = MockBoard::new();
        let coordinator = Coordinator::new(board.driver(), fast_config()).unwrap();
        let lines = coordinator.config().lines.clone();

        block_on(coordinator.flash(1, &FlashTarget::Even)).unwrap();

        assert_eq!(high_writes(&board, lines[0]), 0);
        assert_eq!(high_writes(&board, lines[1]), 1);
        assert_eq!(high_writes(&board, lines[7]), 1);
        assert!(board.all_low(&lines));
    }

    #[test]
    fn test_flash_explicit_lines() {
        let board = MockBoard::new();
        let coordinator = Coordinator::new(board.driver(), fast_config()).unwrap();
        let target = FlashTarget::Lines(vec![Line(5), Line(26), Line(5)]);

        block_on(coordinator.flash(3, &target)).unwrap();

        assert_eq!(high_writes(&board, Line(5)), 3);
        assert_eq!(high_writes(&board, Line(26)), 3);
        assert_eq!(high_writes(&board, Line(17)), 0);
        assert!(board.all_low(&coordinator.config().lines));
    }

    #[test]
    fn test_flash_pulses_back_to_back_by_default() {
        let defaults = EffectConfig::default().flash;
        assert_eq!(defaults.on, Duration::from_millis(200));
        assert_eq!(defaults.off, Duration::from_millis(0));

        let board = MockBoard::new();
        let mut config = fast_config();
        config.flash.off = defaults.off;
        let coordinator = Coordinator::new(board.driver(), config).unwrap();
        let line = coordinator.config().indicator_line();

        block_on(coordinator.flash(3, &FlashTarget::All)).unwrap();

        let levels: Vec<Level> = board
            .events_for(line)
            .into_iter()
            .filter_map(|event| match event {
                Event::Write(_, level) => Some(level),
                _ => None,
            })
            .collect();
        use Level::{High, Low};
        // Final low comes from the teardown.
        assert_eq!(levels, [High, Low, High, Low, High, Low, Low]);
    }

    #[test]
    fn test_flash_rejects_bad_input_without_writes() {
        let board = MockBoard::new();
        let coordinator = Coordinator::new(board.driver(), fast_config()).unwrap();
        let events = board.event_count();

        block_on(async {
            let unknown = FlashTarget::Lines(vec![Line(17), Line(4)]);
            assert!(matches!(
                coordinator.flash(1, &unknown).await,
                Err(EffectError::UnknownLine(Line(4)))
            ));
            assert!(matches!(
                coordinator.flash(1, &FlashTarget::Lines(Vec::new())).await,
                Err(EffectError::EmptySelection)
            ));
            assert!(matches!(
                coordinator.flash(0, &FlashTarget::All).await,
                Err(EffectError::ZeroRepeat)
            ));
        });

        assert_eq!(board.event_count(), events);
    }

    #[test]
    fn test_flash_stops_early_and_leaves_lines_low() {
        let board = MockBoard::new();
        let coordinator = Coordinator::new(board.driver(), fast_config()).unwrap();
        let lines = coordinator.config().lines.clone();

        let (result, stop) = block_on(join(coordinator.flash(1000, &FlashTarget::All), async {
            Timer::after(Duration::from_millis(40)).await;
            coordinator.request_stop()
        }));

        result.unwrap();
        assert_eq!(stop, StopRequest::Signalled);
        let pulses = high_writes(&board, lines[0]);
        assert!(pulses >= 1 && pulses < 1000, "pulses: {pulses}");
        assert!(board.all_low(&lines));
        assert!(!coordinator.is_active());
    }

    #[test]
    fn test_concurrent_flashes_do_not_overlap() {
        let board = MockBoard::new();
        let coordinator = Coordinator::new(board.driver(), fast_config()).unwrap();
        let lines = coordinator.config().lines.clone();
        let odd: Vec<Line> = lines.iter().copied().step_by(2).collect();

        let (first, second) = block_on(join(
            coordinator.flash(3, &FlashTarget::Odd),
            coordinator.flash(3, &FlashTarget::Even),
        ));
        first.unwrap();
        second.unwrap();

        let events = board.events();
        let last_odd = events
            .iter()
            .rposition(|event| event.line().is_some_and(|line| odd.contains(&line)))
            .unwrap();
        let first_even = events
            .iter()
            .position(|event| event.line().is_some_and(|line| !odd.contains(&line)))
            .unwrap();
        assert!(last_odd < first_even);
        assert!(board.all_low(&lines));
    }

    #[test]
    fn test_flash_cleans_displayed_number_first() {
        let board = MockBoard::new();
        let coordinator = Coordinator::new(board.driver(), fast_config()).unwrap();
        let lines = coordinator.config().lines.clone();

        block_on(async {
            coordinator.show_number(127, true).await.unwrap();
            coordinator.flash(1, &FlashTarget::Odd).await.unwrap();
        });

        assert!(!coordinator.is_cleanup_required());
        assert!(board.all_low(&lines));
        // The indicator is released before the flash drives its line high.
        let indicator = board.events_for(lines[0]);
        let stop = indicator
            .iter()
            .position(|event| matches!(event, Event::StopPwm(_)))
            .unwrap();
        let high = indicator
            .iter()
            .position(|event| matches!(event, Event::Write(_, Level::High)))
            .unwrap();
        assert!(stop < high);
        assert_eq!(board.line(lines[0]), Some(LineState::Low));
    }
}
